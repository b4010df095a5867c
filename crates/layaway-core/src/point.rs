use serde::{Deserialize, Serialize};

/// A single historical price observation as reported by the oracle.
/// Only `value` and `timestamp` are read; any other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    /// USD price
    pub value: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// A chart-ready point with its human-readable label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub price: f64,
    pub label: String,
}
