//! FILENAME: inventory/src/value.rs
//! PURPOSE: Defines the scalar value a dimension field can hold.
//! CONTEXT: Dimension fields arrive from the data store as strings or numbers.
//! Grouping works on their displayed form, so `Display` must render numbers
//! exactly the way the application shows them (5, not 5.0).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used wherever a dimension value is absent.
pub const MISSING_LABEL: &str = "N/A";

/// A scalar value held by a dimension field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Returns the display label of an optional value, substituting
    /// [`MISSING_LABEL`] for absent values.
    pub fn label_of(value: Option<&FieldValue>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => MISSING_LABEL.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => {
                // -0 and 0 are the same label
                let n = if *n == 0.0 { 0.0 } else { *n };
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}
