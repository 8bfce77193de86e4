//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot computation.
//! These structures are designed to be:
//! - Serializable (sent from the UI layer as JSON)
//! - Immutable snapshots of user intent
//! - Validated at the boundary, never inside the engine

use inventory::{DimensionField, SchemaError, ValueField};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for the value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Count,
    Sum,
    #[serde(alias = "average")]
    Avg,
    #[serde(alias = "minimum")]
    Min,
    #[serde(alias = "maximum")]
    Max,
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Count,
        Aggregation::Sum,
        Aggregation::Avg,
        Aggregation::Min,
        Aggregation::Max,
    ];

    /// Whether the aggregation reads the value field at all.
    pub fn reads_value(self) -> bool {
        !matches!(self, Aggregation::Count)
    }

    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Count => "Count",
            Aggregation::Sum => "Sum",
            Aggregation::Avg => "Average",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Aggregation::Count => "count",
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        };
        f.write_str(s)
    }
}

impl FromStr for Aggregation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(Aggregation::Count),
            "sum" => Ok(Aggregation::Sum),
            "avg" | "average" => Ok(Aggregation::Avg),
            "min" | "minimum" => Ok(Aggregation::Min),
            "max" | "maximum" => Ok(Aggregation::Max),
            _ => Err(ConfigError::UnknownAggregation(s.to_string())),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// The pivot axis a field list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Columns,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rows => f.write_str("rows"),
            Axis::Columns => f.write_str("columns"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Pivot {0} need at least one field")]
    EmptyAxis(Axis),

    #[error("Unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error(transparent)]
    Field(#[from] SchemaError),

    #[error("Invalid pivot configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// MAIN CONFIG STRUCT
// ============================================================================

/// The aggregation request: which dimensions form rows and columns, which
/// numeric field is reduced, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    /// Fields forming the row key (ordered, joined with `|`).
    pub row_fields: Vec<DimensionField>,

    /// Fields forming the column key (ordered, joined with `|`).
    pub column_fields: Vec<DimensionField>,

    /// Field to aggregate. Ignored for `Count`. `None` under any other
    /// aggregation makes every cell zero.
    #[serde(deserialize_with = "lenient_value_field")]
    pub value_field: Option<ValueField>,

    pub aggregation: Aggregation,
}

impl Default for PivotConfig {
    fn default() -> Self {
        PivotConfig {
            row_fields: vec![DimensionField::Category],
            column_fields: vec![DimensionField::Status],
            value_field: Some(ValueField::QuantityInStock),
            aggregation: Aggregation::Count,
        }
    }
}

/// Unknown value field names deserialize to `None` instead of failing.
fn lenient_value_field<'de, D>(deserializer: D) -> Result<Option<ValueField>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| name.parse().ok()))
}

impl PivotConfig {
    pub fn new(
        row_fields: Vec<DimensionField>,
        column_fields: Vec<DimensionField>,
        value_field: Option<ValueField>,
        aggregation: Aggregation,
    ) -> Self {
        PivotConfig {
            row_fields,
            column_fields,
            value_field,
            aggregation,
        }
    }

    /// Builds a config from the names the UI dropdowns carry.
    /// Dimension names must be known; an unknown value field name is
    /// accepted and aggregates as zero.
    pub fn from_names(
        row_fields: &[&str],
        column_fields: &[&str],
        value_field: Option<&str>,
        aggregation: &str,
    ) -> Result<Self, ConfigError> {
        let rows = row_fields
            .iter()
            .map(|name| name.parse::<DimensionField>())
            .collect::<Result<Vec<_>, _>>()?;
        let columns = column_fields
            .iter()
            .map(|name| name.parse::<DimensionField>())
            .collect::<Result<Vec<_>, _>>()?;
        let aggregation = aggregation.parse::<Aggregation>()?;

        let value = value_field.and_then(|name| match name.parse::<ValueField>() {
            Ok(field) => Some(field),
            Err(e) => {
                if aggregation.reads_value() {
                    log::warn!("{}; {} will aggregate as zero", e, aggregation);
                }
                None
            }
        });

        let config = PivotConfig::new(rows, columns, value, aggregation);
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON config. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PivotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_fields.is_empty() {
            return Err(ConfigError::EmptyAxis(Axis::Rows));
        }
        if self.column_fields.is_empty() {
            return Err(ConfigError::EmptyAxis(Axis::Columns));
        }
        Ok(())
    }

    /// Caption for the value area, e.g. "Sum of Total Cost".
    pub fn value_caption(&self) -> String {
        match (self.aggregation, self.value_field) {
            (Aggregation::Count, _) => "Count".to_string(),
            (agg, Some(field)) => format!("{} of {}", agg.label(), field.display_name()),
            (agg, None) => agg.label().to_string(),
        }
    }

    /// Header for the row label column, e.g. "Category / Location".
    pub fn row_caption(&self) -> String {
        self.row_fields
            .iter()
            .map(|f| f.display_name())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_both_axes() {
        let config = PivotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.value_caption(), "Count");
    }

    #[test]
    fn test_from_json_with_defaults_and_aliases() {
        let config = PivotConfig::from_json(
            r#"{"row_fields":["location","vendor"],"value_field":"total_cost","aggregation":"average"}"#,
        )
        .unwrap();
        assert_eq!(config.row_fields, vec![DimensionField::Location, DimensionField::Vendor]);
        assert_eq!(config.column_fields, vec![DimensionField::Status]);
        assert_eq!(config.value_field, Some(ValueField::TotalCost));
        assert_eq!(config.aggregation, Aggregation::Avg);
        assert_eq!(config.value_caption(), "Average of Total Cost");
        assert_eq!(config.row_caption(), "Location / Vendor");
    }

    #[test]
    fn test_unknown_value_field_is_lenient() {
        let config =
            PivotConfig::from_json(r#"{"value_field":"weight","aggregation":"sum"}"#).unwrap();
        assert_eq!(config.value_field, None);

        let config =
            PivotConfig::from_names(&["category"], &["status"], Some("weight"), "max").unwrap();
        assert_eq!(config.value_field, None);
        assert_eq!(config.aggregation, Aggregation::Max);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            PivotConfig::from_json(r#"{"column_fields":[]}"#),
            Err(ConfigError::EmptyAxis(Axis::Columns))
        ));
        assert!(matches!(
            PivotConfig::from_names(&["colour"], &["status"], None, "count"),
            Err(ConfigError::Field(SchemaError::UnknownField(_)))
        ));
        assert!(matches!(
            PivotConfig::from_names(&["category"], &["status"], None, "median"),
            Err(ConfigError::UnknownAggregation(_))
        ));
        assert!(matches!(PivotConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = PivotConfig::new(
            vec![DimensionField::FinancialYear],
            vec![DimensionField::Condition, DimensionField::Unit],
            Some(ValueField::Rate),
            Aggregation::Min,
        );
        let json = config.to_json().unwrap();
        assert_eq!(PivotConfig::from_json(&json).unwrap(), config);
    }
}
