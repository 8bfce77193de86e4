//! FILENAME: persistence/tests/xlsx_round_trip.rs
//! Workbooks written by the exporters and read back through calamine.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, Utc};
use inventory::{DimensionField, InventoryRecord, ValueField};
use persistence::{
    load_records_xlsx, save_pivot_xlsx, save_records_xlsx, ExportOptions, PersistenceError,
};
use pivot_engine::{compute_pivot, Aggregation, PivotConfig};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn records() -> Vec<InventoryRecord> {
    vec![
        InventoryRecord::new("Dell Latitude")
            .with_dimension(DimensionField::Category, "Laptop")
            .with_dimension(DimensionField::Status, "available")
            .with_dimension(DimensionField::FinancialYear, 2024.0)
            .with_value(ValueField::QuantityInStock, 5.0)
            .with_value(ValueField::Rate, 550.5),
        InventoryRecord::new("ThinkPad")
            .with_dimension(DimensionField::Category, "Laptop")
            .with_dimension(DimensionField::Status, "issued")
            .with_value(ValueField::QuantityInStock, 2.0),
        InventoryRecord::new("LG 27")
            .with_dimension(DimensionField::Category, "Monitor")
            .with_dimension(DimensionField::Status, "available")
            .with_value(ValueField::QuantityInStock, 10.0),
    ]
}

fn sum_config() -> PivotConfig {
    PivotConfig::new(
        vec![DimensionField::Category],
        vec![DimensionField::Status],
        Some(ValueField::QuantityInStock),
        Aggregation::Sum,
    )
}

#[test]
fn pivot_workbook_contains_grid_and_totals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pivot.xlsx");

    let table = compute_pivot(&records(), &sum_config());
    save_pivot_xlsx(&table, "Category", &ExportOptions::default(), &path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Pivot").unwrap();

    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Category".to_string())));
    assert_eq!(range.get_value((0, 3)), Some(&Data::String("Total".to_string())));
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("Laptop".to_string())));
    assert_eq!(range.get_value((1, 1)), Some(&Data::Float(5.0)));
    assert_eq!(range.get_value((2, 2)), Some(&Data::Float(0.0)));
    assert_eq!(range.get_value((3, 0)), Some(&Data::String("Total".to_string())));
    assert_eq!(range.get_value((3, 3)), Some(&Data::Float(17.0)));
}

#[test]
fn pivot_workbook_title_shifts_the_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("titled.xlsx");

    let options = ExportOptions {
        sheet_name: "Stock".to_string(),
        ..ExportOptions::default()
    }
    .with_title("Stock by category");
    let table = compute_pivot(&records(), &sum_config());
    save_pivot_xlsx(&table, "Category", &options, &path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Stock").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Stock by category".to_string())));
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("Category".to_string())));
    assert_eq!(range.get_value((5, 3)), Some(&Data::Float(17.0)));
}

#[test]
fn records_round_trip_through_xlsx() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.xlsx");

    let mut original = records();
    original[0].created_at = "2024-04-01T15:30:00Z".parse::<DateTime<Utc>>().ok();
    save_records_xlsx(&original, &path).unwrap();

    let report = load_records_xlsx(&path, None).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.records.len(), original.len());

    for (read, written) in report.records.iter().zip(&original) {
        assert_eq!(read.item_name, written.item_name);
        assert_eq!(read.category, written.category);
        assert_eq!(read.status, written.status);
        assert_eq!(read.quantity_in_stock, written.quantity_in_stock);
        assert_eq!(read.rate, written.rate);
        assert_eq!(read.created_at, written.created_at);
    }
    assert_eq!(
        report.records[0].dimension(DimensionField::FinancialYear).map(|v| v.to_string()),
        Some("2024".to_string())
    );

    // The re-imported records pivot to the same table.
    assert_eq!(
        compute_pivot(&report.records, &sum_config()),
        compute_pivot(&original, &sum_config())
    );
}

#[test]
fn unknown_sheet_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.xlsx");
    save_records_xlsx(&records(), &path).unwrap();

    let err = load_records_xlsx(&path, Some("Sheet9")).unwrap_err();
    assert!(matches!(err, PersistenceError::SheetNotFound(ref name) if name == "Sheet9"));
    assert!(load_records_xlsx(&path, Some("Inventory")).is_ok());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_records_xlsx(&dir.path().join("absent.xlsx"), None).is_err());
}

#[test]
fn numeric_name_cells_upload_without_decimals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("upload.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Item Name").unwrap();
    sheet.write_string(0, 1, "Category").unwrap();
    sheet.write_number(1, 0, 1234.0).unwrap();
    sheet.write_string(1, 1, "Spares").unwrap();
    workbook.save(&path).unwrap();

    let report = load_records_xlsx(&path, None).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.records[0].item_name, "1234");
}
