//! FILENAME: pivot-engine/src/lib.rs
//! Pivot aggregation subsystem.
//!
//! This crate provides the pivot calculation engine as a standalone
//! module. It depends on `inventory` only for the record schema.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `accumulator`: Per-cell aggregate state (HOW we reduce)
//! - `engine`: Calculation engine (HOW we calculate)
//! - `view`: The computed table and its shared consumer interface (WHAT we display)
//! - `chart`: Chart series built from the view

pub mod accumulator;
pub mod chart;
pub mod definition;
pub mod engine;
pub mod view;

pub use accumulator::AggregateAccumulator;
pub use chart::{render_chart, Chart, ChartKind, PieSlice, Series};
pub use definition::*;
pub use engine::{column_key, composite_key, compute_pivot, drill_down, row_key, KEY_SEPARATOR};
pub use view::{format_value, GridValue, PivotSource, PivotTable, TOTAL_LABEL};
