//! FILENAME: pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a table.
//!
//! This module takes a PivotConfig and a set of inventory records and
//! produces a PivotTable (sorted rows × sorted columns of aggregated values).
//!
//! Algorithm:
//! 1. Map every record to its composite row key and column key
//! 2. Collect and sort the distinct keys of each axis
//! 3. Bucket records once by (row index, column index), accumulating values
//! 4. Read every bucket out under the configured aggregation (empty = 0)
//!
//! The engine is pure: no I/O, no caching, no mutation of its inputs.

use inventory::{DimensionField, FieldValue, InventoryRecord};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::accumulator::AggregateAccumulator;
use crate::definition::PivotConfig;
use crate::view::PivotTable;

/// Separator between the parts of a composite key.
pub const KEY_SEPARATOR: &str = "|";

// ============================================================================
// COMPOSITE KEYS
// ============================================================================

/// Joins a record's labels for `fields` with `|`, absent values as "N/A".
pub fn composite_key(record: &InventoryRecord, fields: &[DimensionField]) -> String {
    if let [field] = fields {
        return FieldValue::label_of(record.dimension(*field));
    }
    let parts: SmallVec<[String; 4]> = fields
        .iter()
        .map(|f| FieldValue::label_of(record.dimension(*f)))
        .collect();
    parts.join(KEY_SEPARATOR)
}

pub fn row_key(record: &InventoryRecord, config: &PivotConfig) -> String {
    composite_key(record, &config.row_fields)
}

pub fn column_key(record: &InventoryRecord, config: &PivotConfig) -> String {
    composite_key(record, &config.column_fields)
}

/// The number a record contributes to its cell. Absent values count as 0;
/// `Count` never reads the value field.
fn extract_value(record: &InventoryRecord, config: &PivotConfig) -> f64 {
    if !config.aggregation.reads_value() {
        return 0.0;
    }
    config
        .value_field
        .and_then(|field| record.value(field))
        .unwrap_or(0.0)
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// A record reduced to what the engine needs.
struct KeyedRecord {
    row_key: String,
    column_key: String,
    value: f64,
}

fn sorted_distinct<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: FxHashSet<&str> = keys.collect();
    let mut sorted: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    sorted.sort_unstable();
    sorted
}

fn index_of(labels: &[String]) -> FxHashMap<&str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect()
}

/// Computes the pivot table for `records` under `config`.
///
/// Axes with no fields are the caller's responsibility (see
/// [`PivotConfig::validate`]); with an empty field list every record maps
/// to the empty key.
pub fn compute_pivot<'a, I>(records: I, config: &PivotConfig) -> PivotTable
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let keyed: Vec<KeyedRecord> = records
        .into_iter()
        .map(|record| KeyedRecord {
            row_key: row_key(record, config),
            column_key: column_key(record, config),
            value: extract_value(record, config),
        })
        .collect();

    if keyed.is_empty() {
        log::debug!("pivot over empty record set");
        return PivotTable::empty(config.aggregation);
    }

    let rows = sorted_distinct(keyed.iter().map(|k| k.row_key.as_str()));
    let columns = sorted_distinct(keyed.iter().map(|k| k.column_key.as_str()));

    // (bucket, value) pairs in a canonical order: floating-point sums depend
    // on the order of their terms, and input order must not show through.
    let mut entries: Vec<(usize, f64)> = {
        let row_index = index_of(&rows);
        let column_index = index_of(&columns);

        keyed
            .iter()
            .filter_map(|k| {
                // Both keys were collected from `keyed`, so the lookups always hit.
                let r = *row_index.get(k.row_key.as_str())?;
                let c = *column_index.get(k.column_key.as_str())?;
                Some((r * columns.len() + c, k.value))
            })
            .collect()
    };
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut buckets = vec![AggregateAccumulator::new(); rows.len() * columns.len()];
    for (bucket, value) in entries {
        buckets[bucket].add(value);
    }

    let cells: Vec<f64> = buckets
        .iter()
        .map(|acc| acc.compute(config.aggregation))
        .collect();

    log::debug!(
        "pivot computed: {} records -> {} rows x {} columns ({})",
        keyed.len(),
        rows.len(),
        columns.len(),
        config.aggregation
    );

    PivotTable::new(config.aggregation, rows, columns, cells)
}

/// Returns the records behind one cell of the table, in input order.
pub fn drill_down<'a, I>(
    records: I,
    config: &PivotConfig,
    row: &str,
    column: &str,
) -> Vec<&'a InventoryRecord>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    records
        .into_iter()
        .filter(|record| row_key(record, config) == row && column_key(record, config) == column)
        .collect()
}
