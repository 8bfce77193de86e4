//! FILENAME: persistence/src/columns.rs
//! Fixed column layout of the raw record export.

use inventory::{DimensionField, FieldValue, InventoryRecord, ValueField};
use pivot_engine::GridValue;

/// One column of the record export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordColumn {
    ItemName,
    Description,
    Dimension(DimensionField),
    Value(ValueField),
    CreatedAt,
}

/// Item name, description, every dimension, every value, creation time.
pub fn record_columns() -> Vec<RecordColumn> {
    let mut columns = vec![RecordColumn::ItemName, RecordColumn::Description];
    columns.extend(DimensionField::ALL.into_iter().map(RecordColumn::Dimension));
    columns.extend(ValueField::ALL.into_iter().map(RecordColumn::Value));
    columns.push(RecordColumn::CreatedAt);
    columns
}

impl RecordColumn {
    /// Header text. Normalising it gives back the data-store column name, so
    /// an exported file can be uploaded again unchanged.
    pub fn header(self) -> &'static str {
        match self {
            RecordColumn::ItemName => "Item Name",
            RecordColumn::Description => "Description",
            RecordColumn::Dimension(field) => field.display_name(),
            RecordColumn::Value(field) => field.display_name(),
            RecordColumn::CreatedAt => "Created At",
        }
    }

    /// The record's value in this column; `None` is a blank cell.
    pub fn cell(self, record: &InventoryRecord) -> Option<GridValue> {
        match self {
            RecordColumn::ItemName => Some(GridValue::text(&record.item_name)),
            RecordColumn::Description => record.description.as_ref().map(GridValue::text),
            RecordColumn::Dimension(field) => record.dimension(field).map(|value| match value {
                FieldValue::Number(n) => GridValue::Number(*n),
                FieldValue::Text(s) => GridValue::text(s),
            }),
            RecordColumn::Value(field) => record.value(field).map(GridValue::Number),
            RecordColumn::CreatedAt => record.created_at.map(|ts| GridValue::Text(ts.to_rfc3339())),
        }
    }
}
