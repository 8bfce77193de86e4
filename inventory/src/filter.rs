//! FILENAME: inventory/src/filter.rs
//! Client-side record filtering.
//!
//! Filters select which records reach the pivot engine and the exporters.
//! They only borrow records; the engine downstream sees exactly the
//! filtered subset.

use serde::{Deserialize, Serialize};

use crate::schema::{DimensionField, InventoryRecord};
use crate::value::FieldValue;

/// The filter state of the inventory list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Case-insensitive substring matched against the item name,
    /// description and every dimension value.
    pub search: Option<String>,

    /// Exact matches on displayed dimension values ("N/A" selects absent).
    pub equals: Vec<(DimensionField, String)>,

    /// Keep only records at or below their minimum stock level.
    pub low_stock_only: bool,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn with_equals(mut self, field: DimensionField, value: impl Into<String>) -> Self {
        self.equals.push((field, value.into()));
        self
    }

    pub fn low_stock_only(mut self) -> Self {
        self.low_stock_only = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.equals.is_empty()
            && !self.low_stock_only
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if self.low_stock_only && !record.is_low_stock() {
            return false;
        }

        let equals_ok = self
            .equals
            .iter()
            .all(|(field, wanted)| FieldValue::label_of(record.dimension(*field)) == *wanted);
        if !equals_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => matches_search(record, &needle.to_lowercase()),
            _ => true,
        }
    }

    /// Borrows the records that pass the filter, in input order.
    pub fn apply<'a, I>(&'a self, records: I) -> impl Iterator<Item = &'a InventoryRecord> + 'a
    where
        I: IntoIterator<Item = &'a InventoryRecord>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |record| self.matches(record))
    }
}

fn matches_search(record: &InventoryRecord, needle: &str) -> bool {
    if record.item_name.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(description) = &record.description {
        if description.to_lowercase().contains(needle) {
            return true;
        }
    }
    DimensionField::ALL.into_iter().any(|field| {
        record
            .dimension(field)
            .map_or(false, |v| v.to_string().to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueField;

    fn records() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("Dell Latitude")
                .with_dimension(DimensionField::Category, "Laptop")
                .with_dimension(DimensionField::Status, "available")
                .with_value(ValueField::QuantityInStock, 5.0)
                .with_value(ValueField::MinimumStockLevel, 2.0),
            InventoryRecord::new("HP ProBook")
                .with_dimension(DimensionField::Category, "Laptop")
                .with_value(ValueField::QuantityInStock, 1.0)
                .with_value(ValueField::MinimumStockLevel, 2.0),
            InventoryRecord::new("LG 24in")
                .with_dimension(DimensionField::Category, "Monitor")
                .with_dimension(DimensionField::Vendor, "Acme Traders")
                .with_dimension(DimensionField::Status, "issued"),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = records();
        let filter = RecordFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records).count(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let records = records();
        let name_filter = RecordFilter::new().search("probook");
        let by_name: Vec<_> = name_filter.apply(&records).collect();
        assert_eq!(by_name.len(), 1);

        let vendor_filter = RecordFilter::new().search("ACME");
        let by_vendor: Vec<_> = vendor_filter.apply(&records).collect();
        assert_eq!(by_vendor[0].item_name, "LG 24in");
    }

    #[test]
    fn test_equals_matches_na_for_absent() {
        let records = records();
        let filter = RecordFilter::new().with_equals(DimensionField::Status, "N/A");
        let names: Vec<_> = filter.apply(&records).map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["HP ProBook"]);
    }

    #[test]
    fn test_low_stock_only() {
        let records = records();
        let filter = RecordFilter::new()
            .with_equals(DimensionField::Category, "Laptop")
            .low_stock_only();
        let names: Vec<_> = filter.apply(&records).map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["HP ProBook"]);
    }
}
