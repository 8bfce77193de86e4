//! FILENAME: persistence/src/import.rs
//! Shared bulk-upload pipeline: header mapping and per-row validation.
//!
//! The CSV and XLSX readers only turn their cells into JSON values; every
//! row then goes through `InventoryRecord::from_json`, the same boundary
//! check the data store uses.

use inventory::{normalize_field_name, DimensionField, InventoryRecord, ValueField};
use serde_json::{Map, Value};

use crate::{ImportReport, PersistenceError, RejectedRow};

const TEXT_COLUMNS: [&str; 5] = ["id", "item_name", "name", "description", "created_at"];

/// Maps a source column header to a data-store column name, or `None` when
/// the column is not part of the record schema.
fn schema_column(header: &str) -> Option<String> {
    let normalized = normalize_field_name(header);
    let known = TEXT_COLUMNS.contains(&normalized.as_str())
        || DimensionField::ALL.iter().any(|f| f.column_name() == normalized)
        || ValueField::ALL.iter().any(|f| f.column_name() == normalized);
    known.then_some(normalized)
}

pub(crate) struct RowImporter {
    columns: Vec<Option<String>>,
    report: ImportReport,
}

impl RowImporter {
    /// Maps the header row. Fails when there is no header or no item name
    /// column, since no row could validate.
    pub fn from_headers<I, S>(headers: I) -> Result<Self, PersistenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<Option<String>> = headers
            .into_iter()
            .map(|h| {
                let column = schema_column(h.as_ref());
                if column.is_none() && !h.as_ref().trim().is_empty() {
                    log::debug!("[IMPORT] ignoring column '{}'", h.as_ref());
                }
                column
            })
            .collect();

        if columns.iter().all(Option::is_none) {
            return Err(PersistenceError::InvalidFormat(
                "file has no recognisable header row".to_string(),
            ));
        }
        let has_name = columns
            .iter()
            .flatten()
            .any(|c| c == "item_name" || c == "name");
        if !has_name {
            return Err(PersistenceError::InvalidFormat(
                "missing item_name column".to_string(),
            ));
        }

        Ok(RowImporter {
            columns,
            report: ImportReport::default(),
        })
    }

    /// Validates one data row. Rows with every cell blank are skipped.
    pub fn push_row(&mut self, line: usize, cells: impl IntoIterator<Item = Value>) {
        let mut obj = Map::new();
        for (column, value) in self.columns.iter().zip(cells) {
            let Some(column) = column else { continue };
            if is_blank(&value) {
                continue;
            }
            obj.insert(column.clone(), value);
        }

        if obj.is_empty() {
            return;
        }

        match InventoryRecord::from_json(&Value::Object(obj)) {
            Ok(record) => self.report.records.push(record),
            Err(e) => self.reject(line, e.to_string()),
        }
    }

    pub fn reject(&mut self, line: usize, reason: String) {
        log::warn!("[IMPORT] line {} rejected: {}", line, reason);
        self.report.rejected.push(RejectedRow { line, reason });
    }

    pub fn finish(self) -> ImportReport {
        log::info!(
            "[IMPORT] {} records accepted, {} rows rejected",
            self.report.records.len(),
            self.report.rejected.len()
        );
        self.report
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
