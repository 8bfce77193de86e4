//! FILENAME: pivot-engine/src/accumulator.rs
//! Per-cell aggregate state.
//!
//! Each (row key, column key) bucket owns one accumulator. Records are added
//! once, in input order, and the final value is read out for whichever
//! aggregation the config asks for.

use serde::{Deserialize, Serialize};

use crate::definition::Aggregation;

/// Accumulator for computing aggregates incrementally.
/// Stores the intermediate state needed for all aggregation types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record's extracted value (already coerced, absent = 0).
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Computes the final aggregate value. An empty bucket is always 0.
    pub fn compute(&self, aggregation: Aggregation) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match aggregation {
            Aggregation::Count => self.count as f64,
            Aggregation::Sum => self.sum,
            Aggregation::Avg => self.sum / (self.count as f64),
            Aggregation::Min => self.min.unwrap_or(0.0),
            Aggregation::Max => self.max.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_is_zero_for_every_aggregation() {
        let acc = AggregateAccumulator::new();
        for agg in Aggregation::ALL {
            let v = acc.compute(agg);
            assert_eq!(v, 0.0, "{} of nothing", agg);
            assert!(!v.is_nan());
        }
    }

    #[test]
    fn test_accumulates_all_statistics() {
        let mut acc = AggregateAccumulator::new();
        for v in [4.0, -1.0, 0.0, 9.0] {
            acc.add(v);
        }
        assert_eq!(acc.compute(Aggregation::Count), 4.0);
        assert_eq!(acc.compute(Aggregation::Sum), 12.0);
        assert_eq!(acc.compute(Aggregation::Avg), 3.0);
        assert_eq!(acc.compute(Aggregation::Min), -1.0);
        assert_eq!(acc.compute(Aggregation::Max), 9.0);
    }
}
