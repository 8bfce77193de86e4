//! FILENAME: persistence/src/xlsx_reader.rs

use crate::import::RowImporter;
use crate::{ImportReport, PersistenceError};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use std::path::Path;

/// Reads a bulk-upload workbook. Uses the named sheet, or the first sheet
/// when `sheet` is `None`. The first row of the sheet is the header.
pub fn load_records_xlsx(
    path: &Path,
    sheet: Option<&str>,
) -> Result<ImportReport, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or_else(|| {
            PersistenceError::InvalidFormat("Workbook contains no sheets".to_string())
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Err(PersistenceError::InvalidFormat(format!(
            "sheet '{}' is empty",
            sheet_name
        )));
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let mut importer = RowImporter::from_headers(&headers)?;

    // Ranges start at the first used cell, not necessarily at A1.
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    for (i, row) in rows.enumerate() {
        importer.push_row(first_line + i + 1, row.iter().map(cell_value));
    }

    Ok(importer.finish())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(f) => number(*f),
        Data::Int(i) => Value::from(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => {
            log::debug!("[IMPORT] cell error {:?} read as blank", e);
            Value::Null
        }
        Data::DateTime(dt) => excel_serial_to_rfc3339(dt.as_f64())
            .map(Value::String)
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
    }
}

fn number(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Converts an Excel serial date (days since 1899-12-30) to RFC 3339.
fn excel_serial_to_rfc3339(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let ts = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    Some(ts.and_utc().to_rfc3339())
}
