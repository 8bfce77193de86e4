//! FILENAME: persistence/src/xlsx_writer.rs

use crate::columns::{record_columns, RecordColumn};
use crate::{ExportOptions, PersistenceError};
use inventory::InventoryRecord;
use pivot_engine::{Aggregation, GridValue, PivotSource};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

const HEADER_FILL: u32 = 0xD9E1F2;
const RECORDS_SHEET: &str = "Inventory";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub fn save_pivot_xlsx<S: PivotSource + ?Sized>(
    source: &S,
    row_header: &str,
    options: &ExportOptions,
    path: &Path,
) -> Result<(), PersistenceError> {
    let mut xlsx = pivot_workbook(source, row_header, options)?;
    xlsx.save(path)?;
    log::info!("[EXPORT] pivot saved to {}", path.display());
    Ok(())
}

/// Same workbook as [`save_pivot_xlsx`], as bytes for a download response.
pub fn pivot_xlsx_bytes<S: PivotSource + ?Sized>(
    source: &S,
    row_header: &str,
    options: &ExportOptions,
) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = pivot_workbook(source, row_header, options)?;
    Ok(xlsx.save_to_buffer()?)
}

pub fn save_records_xlsx<'a, I>(records: I, path: &Path) -> Result<(), PersistenceError>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let mut xlsx = records_workbook(records)?;
    xlsx.save(path)?;
    log::info!("[EXPORT] records saved to {}", path.display());
    Ok(())
}

pub fn records_xlsx_bytes<'a, I>(records: I) -> Result<Vec<u8>, PersistenceError>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let mut xlsx = records_workbook(records)?;
    Ok(xlsx.save_to_buffer()?)
}

// ============================================================================
// WORKBOOK BUILDERS
// ============================================================================

fn pivot_workbook<S: PivotSource + ?Sized>(
    source: &S,
    row_header: &str,
    options: &ExportOptions,
) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    let grid = source.to_grid(row_header, options.include_totals);
    let width = grid.first().map_or(0, Vec::len);
    for col in 0..width {
        worksheet.set_column_width(column_index(col)?, options.column_width)?;
    }

    let mut first_row = 0u32;
    if let Some(title) = &options.title {
        let title_format = Format::new().set_bold().set_font_size(14.0);
        worksheet.write_string_with_format(0, 0, title, &title_format)?;
        first_row = 2;
    }

    let header_format = header_format();
    let label_format = Format::new();
    let total_label_format = Format::new().set_bold().set_border_top(FormatBorder::Thin);
    let number_format = Format::new().set_num_format(number_format_for(source.aggregation()));
    let total_number_format = number_format.clone().set_bold();

    let last_line = grid.len().saturating_sub(1);
    for (i, line) in grid.iter().enumerate() {
        let row = first_row + row_index(i)?;
        let totals_line = options.include_totals && i > 0 && i == last_line;

        for (j, value) in line.iter().enumerate() {
            let col = column_index(j)?;
            let totals_column = options.include_totals && j + 1 == line.len();

            match value {
                GridValue::Text(s) => {
                    let format = if i == 0 {
                        &header_format
                    } else if totals_line {
                        &total_label_format
                    } else {
                        &label_format
                    };
                    worksheet.write_string_with_format(row, col, s, format)?;
                }
                GridValue::Number(n) => {
                    let format = if totals_line || totals_column {
                        &total_number_format
                    } else {
                        &number_format
                    };
                    worksheet.write_number_with_format(row, col, *n, format)?;
                }
            }
        }
    }

    worksheet.set_freeze_panes(first_row + 1, 1)?;
    log::debug!(
        "[EXPORT] pivot sheet '{}' with {} lines, {} columns",
        options.sheet_name,
        grid.len(),
        width
    );
    Ok(xlsx)
}

fn records_workbook<'a, I>(records: I) -> Result<XlsxWorkbook, PersistenceError>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let columns = record_columns();
    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(RECORDS_SHEET)?;

    let header_format = header_format();
    for (j, column) in columns.iter().enumerate() {
        let col = column_index(j)?;
        worksheet.write_string_with_format(0, col, column.header(), &header_format)?;
        worksheet.set_column_width(col, 16.0)?;
    }

    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let mut row = 0u32;
    for record in records {
        row += 1;
        for (j, column) in columns.iter().enumerate() {
            let col = column_index(j)?;
            match column {
                // A real Excel datetime, so the time of day survives a re-upload.
                RecordColumn::CreatedAt => {
                    if let Some(ts) = record.created_at {
                        let naive = ts.naive_utc();
                        worksheet.write_datetime_with_format(row, col, &naive, &datetime_format)?;
                    }
                }
                _ => write_cell(worksheet, row, col, column.cell(record))?,
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    log::debug!("[EXPORT] {} records written to sheet '{}'", row, RECORDS_SHEET);
    Ok(xlsx)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<GridValue>,
) -> Result<(), PersistenceError> {
    match value {
        None => {}
        Some(GridValue::Text(s)) => {
            worksheet.write_string(row, col, &s)?;
        }
        Some(GridValue::Number(n)) => {
            worksheet.write_number(row, col, n)?;
        }
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border_bottom(FormatBorder::Thin)
}

/// Averages keep two decimals like the table view; everything else uses
/// General so whole numbers show without a decimal point.
fn number_format_for(aggregation: Aggregation) -> &'static str {
    match aggregation {
        Aggregation::Avg => "0.00",
        _ => "General",
    }
}

fn column_index(col: usize) -> Result<u16, PersistenceError> {
    u16::try_from(col).map_err(|_| {
        PersistenceError::InvalidFormat(format!("column {} exceeds the worksheet limit", col))
    })
}

fn row_index(row: usize) -> Result<u32, PersistenceError> {
    u32::try_from(row).map_err(|_| {
        PersistenceError::InvalidFormat(format!("row {} exceeds the worksheet limit", row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formats() {
        assert_eq!(number_format_for(Aggregation::Avg), "0.00");
        assert_eq!(number_format_for(Aggregation::Count), "General");
    }

    #[test]
    fn test_index_limits() {
        assert_eq!(column_index(3).unwrap(), 3);
        assert!(matches!(column_index(70_000), Err(PersistenceError::InvalidFormat(_))));
    }

    #[test]
    fn test_pivot_bytes_are_a_zip_container() {
        let table = pivot_engine::PivotTable::new(
            Aggregation::Sum,
            vec!["Laptop".to_string()],
            vec!["available".to_string()],
            vec![3.0],
        );
        let bytes = pivot_xlsx_bytes(&table, "Category", &ExportOptions::default()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
