//! Numeric facts: equipment parameters extracted alongside a chunk.
//!
//! Schema confirmed against
//! `original_source/ingest/tests/e2e/test_analog_search.py`:
//! `{"flow_rate": {"value": 1000, "unit": "m3/h"}, ...}`. Analog search
//! (C12) filters and scores against these.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single numeric value with its recorded unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericValue {
    /// The numeric value, in `unit`.
    pub value: f64,
    /// The unit the value was recorded in (may or may not be canonical;
    /// see [`crate::units`]).
    pub unit: String,
}

impl NumericValue {
    /// Creates a new numeric value.
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// A map of quantity name to numeric value, e.g. `flow_rate` → `1000 m3/h`.
///
/// Kept as a `BTreeMap` rather than a `HashMap` so serialized facts compare
/// byte-for-byte and iteration order is stable across runs, which matters
/// for deterministic chunk-id derivation when numeric facts are folded into
/// chunk content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericFacts(BTreeMap<String, NumericValue>);

impl NumericFacts {
    /// Creates an empty fact set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a fact.
    pub fn insert(&mut self, quantity: impl Into<String>, value: NumericValue) {
        self.0.insert(quantity.into(), value);
    }

    /// Looks up a fact by quantity name.
    #[must_use]
    pub fn get(&self, quantity: &str) -> Option<&NumericValue> {
        self.0.get(quantity)
    }

    /// Returns `true` if no facts are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all recorded (quantity, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NumericValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
