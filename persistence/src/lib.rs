//! FILENAME: persistence/src/lib.rs
//! Inventory Persistence Module
//!
//! Handles the file formats on the edge of the app: pivot and record export
//! to CSV and XLSX, and bulk upload of records from CSV and XLSX.

mod columns;
mod csv_io;
mod error;
mod import;
mod xlsx_reader;
mod xlsx_writer;

pub use columns::{record_columns, RecordColumn};
pub use csv_io::{load_records_csv, pivot_to_csv, records_to_csv};
pub use error::PersistenceError;
pub use xlsx_reader::load_records_xlsx;
pub use xlsx_writer::{pivot_xlsx_bytes, records_xlsx_bytes, save_pivot_xlsx, save_records_xlsx};

use inventory::InventoryRecord;
use serde::{Deserialize, Serialize};

// ============================================================================
// EXPORT OPTIONS
// ============================================================================

/// Layout options shared by the pivot exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Worksheet name (XLSX only).
    pub sheet_name: String,

    /// Optional title written above the table (XLSX only).
    pub title: Option<String>,

    /// Adds the totals column and the totals line.
    pub include_totals: bool,

    /// Column width in Excel character units (XLSX only).
    pub column_width: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            sheet_name: "Pivot".to_string(),
            title: None,
            include_totals: true,
            column_width: 18.0,
        }
    }
}

impl ExportOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn without_totals(mut self) -> Self {
        self.include_totals = false;
        self
    }
}

// ============================================================================
// IMPORT REPORT
// ============================================================================

/// A data row that failed validation during bulk upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub reason: String,
}

/// Outcome of a bulk upload. Valid rows are kept even when others fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub records: Vec<InventoryRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
