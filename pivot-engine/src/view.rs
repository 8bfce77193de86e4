//! FILENAME: pivot-engine/src/view.rs
//! Pivot View - The computed table and the interface its consumers share.
//!
//! `PivotTable` is the engine's output. The table view, the chart renderers
//! and the export builders all read it through `PivotSource`, so the totals
//! rules and the 2-D grid conversion are written exactly once.

use serde::{Deserialize, Serialize};

use crate::definition::Aggregation;

/// Label of the totals row and column.
pub const TOTAL_LABEL: &str = "Total";

// ============================================================================
// SHARED CONSUMER INTERFACE
// ============================================================================

/// Read access to a computed pivot: sorted row labels, sorted column labels
/// and a dense cell matrix.
pub trait PivotSource {
    fn rows(&self) -> &[String];

    fn columns(&self) -> &[String];

    /// Cell value by index. Every (row, column) pair has a value; empty
    /// intersections are 0.
    fn cell_at(&self, row: usize, column: usize) -> f64;

    fn aggregation(&self) -> Aggregation;

    /// Cell value by label; unknown labels read as 0.
    fn cell(&self, row: &str, column: &str) -> f64 {
        let r = self.rows().iter().position(|r| r == row);
        let c = self.columns().iter().position(|c| c == column);
        match (r, c) {
            (Some(r), Some(c)) => self.cell_at(r, c),
            _ => 0.0,
        }
    }

    /// Total across a row. For `Avg` this is the mean of the row's cell
    /// averages over all columns, empty cells included.
    fn row_total(&self, row: usize) -> f64 {
        let n = self.columns().len();
        let sum: f64 = (0..n).map(|c| self.cell_at(row, c)).sum();
        axis_total(self.aggregation(), sum, n)
    }

    /// Total down a column, same rules as [`PivotSource::row_total`].
    fn column_total(&self, column: usize) -> f64 {
        let n = self.rows().len();
        let sum: f64 = (0..n).map(|r| self.cell_at(r, column)).sum();
        axis_total(self.aggregation(), sum, n)
    }

    /// Total over every cell. For `Avg` the sum is divided by the cell count.
    fn grand_total(&self) -> f64 {
        let (rows, cols) = (self.rows().len(), self.columns().len());
        let mut sum = 0.0;
        for r in 0..rows {
            for c in 0..cols {
                sum += self.cell_at(r, c);
            }
        }
        axis_total(self.aggregation(), sum, rows * cols)
    }

    /// Converts the pivot into the plain 2-D array the workbook and CSV
    /// builders consume: a header line, one line per row and, with
    /// `include_totals`, a totals column and a final totals line.
    fn to_grid(&self, row_header: &str, include_totals: bool) -> Vec<Vec<GridValue>> {
        let rows = self.rows();
        let columns = self.columns();
        let mut grid = Vec::with_capacity(rows.len() + 2);

        let mut header = Vec::with_capacity(columns.len() + 2);
        header.push(GridValue::text(row_header));
        header.extend(columns.iter().map(GridValue::text));
        if include_totals {
            header.push(GridValue::text(TOTAL_LABEL));
        }
        grid.push(header);

        for (r, label) in rows.iter().enumerate() {
            let mut line = Vec::with_capacity(columns.len() + 2);
            line.push(GridValue::text(label));
            line.extend((0..columns.len()).map(|c| GridValue::Number(self.cell_at(r, c))));
            if include_totals {
                line.push(GridValue::Number(self.row_total(r)));
            }
            grid.push(line);
        }

        if include_totals {
            let mut totals = Vec::with_capacity(columns.len() + 2);
            totals.push(GridValue::text(TOTAL_LABEL));
            totals.extend((0..columns.len()).map(|c| GridValue::Number(self.column_total(c))));
            totals.push(GridValue::Number(self.grand_total()));
            grid.push(totals);
        }

        grid
    }
}

fn axis_total(aggregation: Aggregation, sum: f64, len: usize) -> f64 {
    match aggregation {
        // Average of averages, not a re-aggregation of the raw records.
        Aggregation::Avg => {
            if len == 0 {
                0.0
            } else {
                sum / len as f64
            }
        }
        _ => sum,
    }
}

/// A cell of the exported 2-D grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridValue {
    Text(String),
    Number(f64),
}

impl GridValue {
    pub fn text(s: impl Into<String>) -> Self {
        GridValue::Text(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GridValue::Number(n) => Some(*n),
            GridValue::Text(_) => None,
        }
    }
}

// ============================================================================
// PIVOT TABLE
// ============================================================================

/// The derived table produced by `compute_pivot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub aggregation: Aggregation,

    /// Distinct row keys, ascending.
    pub rows: Vec<String>,

    /// Distinct column keys, ascending.
    pub columns: Vec<String>,

    /// Row-major values, `rows.len() * columns.len()` long.
    cells: Vec<f64>,
}

impl PivotTable {
    pub fn new(
        aggregation: Aggregation,
        rows: Vec<String>,
        columns: Vec<String>,
        cells: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(cells.len(), rows.len() * columns.len());
        PivotTable {
            aggregation,
            rows,
            columns,
            cells,
        }
    }

    pub fn empty(aggregation: Aggregation) -> Self {
        PivotTable::new(aggregation, Vec::new(), Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f64] {
        &self.cells
    }

    pub fn row_index(&self, row: &str) -> Option<usize> {
        self.rows.binary_search_by(|r| r.as_str().cmp(row)).ok()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(column)).ok()
    }
}

impl PivotSource for PivotTable {
    fn rows(&self) -> &[String] {
        &self.rows
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn cell_at(&self, row: usize, column: usize) -> f64 {
        self.cells
            .get(row * self.columns.len() + column)
            .copied()
            .unwrap_or(0.0)
    }

    fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    fn cell(&self, row: &str, column: &str) -> f64 {
        match (self.row_index(row), self.column_index(column)) {
            (Some(r), Some(c)) => self.cell_at(r, c),
            _ => 0.0,
        }
    }
}

// ============================================================================
// DISPLAY FORMATTING
// ============================================================================

/// Formats a computed value for display. Averages always show two
/// decimals; other aggregations show integers without a decimal point and
/// fractional values with at most two decimals.
pub fn format_value(aggregation: Aggregation, value: f64) -> String {
    // Anything that rounds to zero at two decimals prints as an unsigned 0.
    let value = if (value * 100.0).round() == 0.0 { 0.0 } else { value };
    if aggregation == Aggregation::Avg {
        return format!("{:.2}", value);
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{:.0}", value);
    }
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample(aggregation: Aggregation) -> PivotTable {
        // Laptop:  available=4, issued=2
        // Monitor: available=6, issued=0 (no records)
        PivotTable::new(
            aggregation,
            labels(&["Laptop", "Monitor"]),
            labels(&["available", "issued"]),
            vec![4.0, 2.0, 6.0, 0.0],
        )
    }

    #[test]
    fn test_cell_lookup() {
        let table = sample(Aggregation::Sum);
        assert_eq!(table.cell("Laptop", "issued"), 2.0);
        assert_eq!(table.cell("Monitor", "issued"), 0.0);
        assert_eq!(table.cell("Printer", "issued"), 0.0);
        assert_eq!(table.cell_at(1, 0), 6.0);
    }

    #[test]
    fn test_totals_sum() {
        let table = sample(Aggregation::Sum);
        assert_eq!(table.row_total(0), 6.0);
        assert_eq!(table.row_total(1), 6.0);
        assert_eq!(table.column_total(0), 10.0);
        assert_eq!(table.column_total(1), 2.0);
        assert_eq!(table.grand_total(), 12.0);
    }

    #[test]
    fn test_totals_avg_are_average_of_averages() {
        let table = sample(Aggregation::Avg);
        assert_eq!(table.row_total(0), 3.0);
        assert_eq!(table.row_total(1), 3.0);
        assert_eq!(table.column_total(0), 5.0);
        assert_eq!(table.column_total(1), 1.0);
        assert_eq!(table.grand_total(), 3.0);
    }

    #[test]
    fn test_empty_table_totals() {
        let table = PivotTable::empty(Aggregation::Avg);
        assert!(table.is_empty());
        assert_eq!(table.grand_total(), 0.0);
        assert_eq!(table.to_grid("Category", true).len(), 2);
    }

    #[test]
    fn test_to_grid_shape() {
        let table = sample(Aggregation::Sum);
        let grid = table.to_grid("Category", true);
        assert_eq!(grid.len(), 4);
        assert_eq!(
            grid[0],
            vec![
                GridValue::text("Category"),
                GridValue::text("available"),
                GridValue::text("issued"),
                GridValue::text("Total"),
            ]
        );
        assert_eq!(grid[1][3], GridValue::Number(6.0));
        assert_eq!(grid[3][0], GridValue::text("Total"));
        assert_eq!(grid[3][3], GridValue::Number(12.0));

        let bare = table.to_grid("Category", false);
        assert_eq!(bare.len(), 3);
        assert!(bare.iter().all(|line| line.len() == 3));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Aggregation::Avg, 3.0), "3.00");
        assert_eq!(format_value(Aggregation::Avg, 2.0 / 3.0), "0.67");
        assert_eq!(format_value(Aggregation::Sum, 17.0), "17");
        assert_eq!(format_value(Aggregation::Sum, 12.5), "12.5");
        assert_eq!(format_value(Aggregation::Max, 0.127), "0.13");
        assert_eq!(format_value(Aggregation::Count, 0.0), "0");
    }

    #[test]
    fn test_format_value_never_prints_negative_zero() {
        assert_eq!(format_value(Aggregation::Sum, -0.004), "0");
        assert_eq!(format_value(Aggregation::Min, -0.0), "0");
        assert_eq!(format_value(Aggregation::Avg, -0.001), "0.00");
        assert_eq!(format_value(Aggregation::Sum, -0.006), "-0.01");
    }
}
