//! FILENAME: inventory/src/schema.rs
//! PURPOSE: The explicit, typed shape of an inventory record.
//! CONTEXT: Rows come out of the data store as loosely typed JSON objects.
//! They are validated exactly once, here, into `InventoryRecord`; nothing
//! downstream (filters, pivot engine, exporters) looks at raw JSON again.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::value::FieldValue;

// ============================================================================
// FIELD NAMES
// ============================================================================

/// Normalises a user-facing field name ("Financial Year", "total-cost")
/// to its snake_case column name.
pub fn normalize_field_name(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Fields that bucket records: they form row and column keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionField {
    Category,
    Status,
    Condition,
    Location,
    Vendor,
    Unit,
    FinancialYear,
}

impl DimensionField {
    pub const ALL: [DimensionField; 7] = [
        DimensionField::Category,
        DimensionField::Status,
        DimensionField::Condition,
        DimensionField::Location,
        DimensionField::Vendor,
        DimensionField::Unit,
        DimensionField::FinancialYear,
    ];

    /// Column name in the data store.
    pub fn column_name(self) -> &'static str {
        match self {
            DimensionField::Category => "category",
            DimensionField::Status => "status",
            DimensionField::Condition => "condition",
            DimensionField::Location => "location",
            DimensionField::Vendor => "vendor",
            DimensionField::Unit => "unit",
            DimensionField::FinancialYear => "financial_year",
        }
    }

    /// Human-readable header.
    pub fn display_name(self) -> &'static str {
        match self {
            DimensionField::Category => "Category",
            DimensionField::Status => "Status",
            DimensionField::Condition => "Condition",
            DimensionField::Location => "Location",
            DimensionField::Vendor => "Vendor",
            DimensionField::Unit => "Unit",
            DimensionField::FinancialYear => "Financial Year",
        }
    }
}

impl fmt::Display for DimensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for DimensionField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_field_name(s);
        DimensionField::ALL
            .into_iter()
            .find(|f| f.column_name() == normalized)
            .ok_or_else(|| SchemaError::UnknownField(s.to_string()))
    }
}

/// Numeric fields that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    QuantityInStock,
    Rate,
    TotalCost,
    MinimumStockLevel,
}

impl ValueField {
    pub const ALL: [ValueField; 4] = [
        ValueField::QuantityInStock,
        ValueField::Rate,
        ValueField::TotalCost,
        ValueField::MinimumStockLevel,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            ValueField::QuantityInStock => "quantity_in_stock",
            ValueField::Rate => "rate",
            ValueField::TotalCost => "total_cost",
            ValueField::MinimumStockLevel => "minimum_stock_level",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ValueField::QuantityInStock => "Quantity In Stock",
            ValueField::Rate => "Rate",
            ValueField::TotalCost => "Total Cost",
            ValueField::MinimumStockLevel => "Minimum Stock Level",
        }
    }
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for ValueField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_field_name(s);
        ValueField::ALL
            .into_iter()
            .find(|f| f.column_name() == normalized)
            .ok_or_else(|| SchemaError::UnknownField(s.to_string()))
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One inventory item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Option<String>,
    pub item_name: String,
    pub description: Option<String>,

    pub category: Option<FieldValue>,
    pub status: Option<FieldValue>,
    pub condition: Option<FieldValue>,
    pub location: Option<FieldValue>,
    pub vendor: Option<FieldValue>,
    pub unit: Option<FieldValue>,
    pub financial_year: Option<FieldValue>,

    pub quantity_in_stock: Option<f64>,
    pub rate: Option<f64>,
    pub total_cost: Option<f64>,
    pub minimum_stock_level: Option<f64>,

    pub created_at: Option<DateTime<Utc>>,
}

impl InventoryRecord {
    pub fn new(item_name: impl Into<String>) -> Self {
        InventoryRecord {
            item_name: item_name.into(),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, field: DimensionField, value: impl Into<FieldValue>) -> Self {
        *self.dimension_slot(field) = Some(value.into());
        self
    }

    pub fn with_value(mut self, field: ValueField, value: f64) -> Self {
        *self.value_slot(field) = Some(value);
        self
    }

    pub fn dimension(&self, field: DimensionField) -> Option<&FieldValue> {
        match field {
            DimensionField::Category => self.category.as_ref(),
            DimensionField::Status => self.status.as_ref(),
            DimensionField::Condition => self.condition.as_ref(),
            DimensionField::Location => self.location.as_ref(),
            DimensionField::Vendor => self.vendor.as_ref(),
            DimensionField::Unit => self.unit.as_ref(),
            DimensionField::FinancialYear => self.financial_year.as_ref(),
        }
    }

    pub fn value(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::QuantityInStock => self.quantity_in_stock,
            ValueField::Rate => self.rate,
            ValueField::TotalCost => self.total_cost,
            ValueField::MinimumStockLevel => self.minimum_stock_level,
        }
    }

    fn dimension_slot(&mut self, field: DimensionField) -> &mut Option<FieldValue> {
        match field {
            DimensionField::Category => &mut self.category,
            DimensionField::Status => &mut self.status,
            DimensionField::Condition => &mut self.condition,
            DimensionField::Location => &mut self.location,
            DimensionField::Vendor => &mut self.vendor,
            DimensionField::Unit => &mut self.unit,
            DimensionField::FinancialYear => &mut self.financial_year,
        }
    }

    fn value_slot(&mut self, field: ValueField) -> &mut Option<f64> {
        match field {
            ValueField::QuantityInStock => &mut self.quantity_in_stock,
            ValueField::Rate => &mut self.rate,
            ValueField::TotalCost => &mut self.total_cost,
            ValueField::MinimumStockLevel => &mut self.minimum_stock_level,
        }
    }

    /// True when a minimum stock level is set and the quantity on hand
    /// (missing counts as zero) has dropped to it or below.
    pub fn is_low_stock(&self) -> bool {
        match self.minimum_stock_level {
            Some(minimum) => self.quantity_in_stock.unwrap_or(0.0) <= minimum,
            None => false,
        }
    }

    /// Validates a loosely typed data-store row into a record.
    pub fn from_json(payload: &Value) -> Result<Self, SchemaError> {
        let obj = payload.as_object().ok_or(SchemaError::NotAnObject)?;

        let item_name = obj
            .get("item_name")
            .or_else(|| obj.get("name"))
            .and_then(scalar_text)
            .ok_or(SchemaError::MissingField("item_name"))?;

        let mut record = InventoryRecord::new(item_name);
        record.id = obj.get("id").and_then(scalar_text);
        record.description = obj.get("description").and_then(scalar_text);

        for field in DimensionField::ALL {
            if let Some(raw) = obj.get(field.column_name()) {
                *record.dimension_slot(field) = parse_dimension(field, raw)?;
            }
        }

        for field in ValueField::ALL {
            *record.value_slot(field) = obj.get(field.column_name()).and_then(parse_number);
        }

        record.created_at = obj
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        Ok(record)
    }

    /// Converts the record back into a data-store row.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();

        if let Some(id) = &self.id {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        obj.insert("item_name".to_string(), Value::String(self.item_name.clone()));
        obj.insert(
            "description".to_string(),
            self.description.clone().map(Value::String).unwrap_or(Value::Null),
        );

        for field in DimensionField::ALL {
            let value = match self.dimension(field) {
                Some(FieldValue::Text(s)) => Value::String(s.clone()),
                Some(FieldValue::Number(n)) => number_to_json(*n),
                None => Value::Null,
            };
            obj.insert(field.column_name().to_string(), value);
        }

        for field in ValueField::ALL {
            let value = self.value(field).map(number_to_json).unwrap_or(Value::Null);
            obj.insert(field.column_name().to_string(), value);
        }

        obj.insert(
            "created_at".to_string(),
            self.created_at
                .map(|ts| Value::String(ts.to_rfc3339()))
                .unwrap_or(Value::Null),
        );

        Value::Object(obj)
    }
}

// ============================================================================
// COERCION HELPERS
// ============================================================================

/// Non-empty trimmed text from a string or number.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        // Spreadsheet cells hold every number as a float; 1234.0 names "1234".
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| FieldValue::Number(f).to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_dimension(
    field: DimensionField,
    value: &Value,
) -> Result<Option<FieldValue>, SchemaError> {
    match value {
        Value::Null => Ok(None),
        Value::String(_) => Ok(scalar_text(value).map(FieldValue::Text)),
        Value::Number(n) => Ok(n.as_f64().filter(|v| v.is_finite()).map(FieldValue::Number)),
        Value::Bool(b) => Ok(Some(FieldValue::Text(b.to_string()))),
        Value::Array(_) | Value::Object(_) => Err(SchemaError::InvalidField {
            field: field.column_name().to_string(),
            reason: "expected a string or number".to_string(),
        }),
    }
}

/// Numeric coercion: anything that is not a finite number becomes absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn number_to_json(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
