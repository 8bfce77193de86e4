//! FILENAME: persistence/src/csv_io.rs
//! CSV export of pivots and records, and CSV bulk upload.

use std::io::Read;

use csv::{ReaderBuilder, Trim, Writer};
use inventory::InventoryRecord;
use pivot_engine::{format_value, GridValue, PivotSource};
use serde_json::Value;

use crate::columns::record_columns;
use crate::import::RowImporter;
use crate::{ExportOptions, ImportReport, PersistenceError};

/// Writes the pivot grid as CSV. Numbers go through `format_value`, so the
/// file shows what the table view shows. Title, sheet name and width only
/// apply to XLSX.
pub fn pivot_to_csv<S: PivotSource + ?Sized>(
    source: &S,
    row_header: &str,
    options: &ExportOptions,
) -> Result<String, PersistenceError> {
    let aggregation = source.aggregation();
    let mut writer = Writer::from_writer(Vec::new());

    for line in source.to_grid(row_header, options.include_totals) {
        writer.write_record(line.iter().map(|value| match value {
            GridValue::Text(s) => s.clone(),
            GridValue::Number(n) => format_value(aggregation, *n),
        }))?;
    }

    finish(writer)
}

/// Writes raw records with the fixed export column layout.
pub fn records_to_csv<'a, I>(records: I) -> Result<String, PersistenceError>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let columns = record_columns();
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header()))?;

    let mut written = 0usize;
    for record in records {
        writer.write_record(columns.iter().map(|c| match c.cell(record) {
            Some(GridValue::Text(s)) => s,
            Some(GridValue::Number(n)) => n.to_string(),
            None => String::new(),
        }))?;
        written += 1;
    }

    log::debug!("[EXPORT] {} records written as CSV", written);
    finish(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, PersistenceError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| PersistenceError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PersistenceError::InvalidFormat(e.to_string()))
}

/// Reads a CSV upload. The first line is the header; each following line is
/// validated on its own and collected into the report.
pub fn load_records_csv<R: Read>(reader: R) -> Result<ImportReport, PersistenceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(PersistenceError::InvalidFormat("file is empty".to_string()));
    }
    let mut importer = RowImporter::from_headers(headers.iter())?;

    for (i, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = result
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        match result {
            Ok(row) => {
                importer.push_row(line, row.iter().map(|cell| Value::String(cell.to_string())))
            }
            Err(e) => importer.reject(line, e.to_string()),
        }
    }

    Ok(importer.finish())
}
