//! FILENAME: pivot-engine/src/chart.rs
//! Chart series built from a computed pivot.
//!
//! Every chart kind reads the same `PivotSource`; the kind only decides how
//! rows, columns and totals are laid out as series.

use serde::{Deserialize, Serialize};

use crate::view::PivotSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Heatmap,
}

impl Default for ChartKind {
    fn default() -> Self {
        ChartKind::Bar
    }
}

/// One named series, one value per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

/// Render-ready chart data, tagged by kind for the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Chart {
    Bar {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Line {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    Heatmap {
        rows: Vec<String>,
        columns: Vec<String>,
        /// Row-major, one inner vector per row.
        values: Vec<Vec<f64>>,
        min: f64,
        max: f64,
    },
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self {
            Chart::Bar { .. } => ChartKind::Bar,
            Chart::Line { .. } => ChartKind::Line,
            Chart::Pie { .. } => ChartKind::Pie,
            Chart::Heatmap { .. } => ChartKind::Heatmap,
        }
    }
}

/// Builds chart data of the given kind.
///
/// - bar / line: categories are the pivot rows, one series per column
/// - pie: one slice per row sized by the row total; zero rows are left out
/// - heatmap: the full cell matrix plus its value range
pub fn render_chart<S: PivotSource + ?Sized>(kind: ChartKind, source: &S) -> Chart {
    match kind {
        ChartKind::Bar => Chart::Bar {
            categories: source.rows().to_vec(),
            series: column_series(source),
        },
        ChartKind::Line => Chart::Line {
            categories: source.rows().to_vec(),
            series: column_series(source),
        },
        ChartKind::Pie => Chart::Pie {
            slices: source
                .rows()
                .iter()
                .enumerate()
                .map(|(r, label)| PieSlice {
                    label: label.clone(),
                    value: source.row_total(r),
                })
                .filter(|slice| slice.value != 0.0)
                .collect(),
        },
        ChartKind::Heatmap => heatmap(source),
    }
}

fn column_series<S: PivotSource + ?Sized>(source: &S) -> Vec<Series> {
    let row_count = source.rows().len();
    source
        .columns()
        .iter()
        .enumerate()
        .map(|(c, name)| Series {
            name: name.clone(),
            values: (0..row_count).map(|r| source.cell_at(r, c)).collect(),
        })
        .collect()
}

fn heatmap<S: PivotSource + ?Sized>(source: &S) -> Chart {
    let column_count = source.columns().len();
    let values: Vec<Vec<f64>> = (0..source.rows().len())
        .map(|r| (0..column_count).map(|c| source.cell_at(r, c)).collect())
        .collect();

    let mut cells = values.iter().flatten().copied();
    let (min, max) = match cells.next() {
        Some(first) => cells.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        None => (0.0, 0.0),
    };

    Chart::Heatmap {
        rows: source.rows().to_vec(),
        columns: source.columns().to_vec(),
        values,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Aggregation;
    use crate::view::PivotTable;

    fn table(aggregation: Aggregation) -> PivotTable {
        PivotTable::new(
            aggregation,
            vec!["Chair".to_string(), "Laptop".to_string(), "Monitor".to_string()],
            vec!["available".to_string(), "issued".to_string()],
            vec![0.0, 0.0, 5.0, 2.0, 10.0, 0.0],
        )
    }

    #[test]
    fn test_bar_series_per_column() {
        let chart = render_chart(ChartKind::Bar, &table(Aggregation::Sum));
        assert_eq!(chart.kind(), ChartKind::Bar);
        let Chart::Bar { categories, series } = chart else {
            panic!("expected a bar chart");
        };
        assert_eq!(categories, vec!["Chair", "Laptop", "Monitor"]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "available");
        assert_eq!(series[0].values, vec![0.0, 5.0, 10.0]);
        assert_eq!(series[1].values, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_line_uses_same_layout_as_bar() {
        let t = table(Aggregation::Sum);
        let (Chart::Bar { series: bar, .. }, Chart::Line { series: line, .. }) =
            (render_chart(ChartKind::Bar, &t), render_chart(ChartKind::Line, &t))
        else {
            panic!("unexpected chart kinds");
        };
        assert_eq!(bar, line);
    }

    #[test]
    fn test_pie_slices_use_row_totals() {
        let Chart::Pie { slices } = render_chart(ChartKind::Pie, &table(Aggregation::Sum)) else {
            panic!("expected a pie chart");
        };
        assert_eq!(
            slices,
            vec![
                PieSlice { label: "Laptop".to_string(), value: 7.0 },
                PieSlice { label: "Monitor".to_string(), value: 10.0 },
            ]
        );

        let Chart::Pie { slices } = render_chart(ChartKind::Pie, &table(Aggregation::Avg)) else {
            panic!("expected a pie chart");
        };
        assert_eq!(slices[0].value, 3.5);
    }

    #[test]
    fn test_heatmap_range() {
        let chart = render_chart(ChartKind::Heatmap, &table(Aggregation::Sum));
        let Chart::Heatmap { values, min, max, .. } = chart else {
            panic!("expected a heatmap");
        };
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], vec![10.0, 0.0]);
        assert_eq!((min, max), (0.0, 10.0));

        let chart = render_chart(ChartKind::Heatmap, &PivotTable::empty(Aggregation::Sum));
        let Chart::Heatmap { min, max, .. } = chart else {
            panic!("expected a heatmap");
        };
        assert_eq!((min, max), (0.0, 0.0));
    }

    #[test]
    fn test_chart_json_is_tagged() {
        let chart = render_chart(ChartKind::Pie, &table(Aggregation::Count));
        let json = serde_json::to_value(chart).unwrap();
        assert_eq!(json["kind"], "pie");
        assert!(json["slices"].is_array());
    }
}
