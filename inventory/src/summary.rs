//! FILENAME: inventory/src/summary.rs
//! Dashboard summary tiles computed over a record set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::{DimensionField, InventoryRecord};
use crate::value::FieldValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_records: usize,
    pub total_quantity: f64,
    /// Sum of `total_cost` (missing counts as zero).
    pub total_value: f64,
    pub low_stock_count: usize,
    /// Record count per status label, sorted by label.
    pub by_status: Vec<(String, usize)>,
}

impl InventorySummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a InventoryRecord>,
    {
        let mut summary = InventorySummary::default();
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            summary.total_records += 1;
            summary.total_quantity += record.quantity_in_stock.unwrap_or(0.0);
            summary.total_value += record.total_cost.unwrap_or(0.0);
            if record.is_low_stock() {
                summary.low_stock_count += 1;
            }
            *by_status
                .entry(FieldValue::label_of(record.dimension(DimensionField::Status)))
                .or_insert(0) += 1;
        }

        summary.by_status = by_status.into_iter().collect();
        summary
    }
}
