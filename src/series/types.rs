//! Core series types: raw observations and the normalized hourly series.

use chrono::{DateTime, Utc};

/// One raw input row as read from the source table, before any cleaning.
///
/// Both fields carry the original cell text: timestamp parsing and numeric
/// coercion are normalization policy, not loader policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    /// Timestamp cell text.
    pub timestamp: String,
    /// Quantity cell text (MW once parsed).
    pub quantity: String,
}

impl RawObservation {
    /// Convenience constructor from cell text.
    pub fn new(timestamp: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            quantity: quantity.into(),
        }
    }
}

/// One cleaned observation: a timezone-aware instant and a load in MW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Observation instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Load in MW.
    pub load_mw: f64,
}

/// An ordered, duplicate-free mapping from timestamp to MW.
///
/// The index is strictly increasing. After normalization it additionally
/// has a uniform one-hour step and every value is finite and >= 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Builds a series from parallel columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns differ in length or the index is not strictly
    /// increasing.
    pub fn from_columns(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Self {
        assert_eq!(
            timestamps.len(),
            values.len(),
            "index and values must be the same length"
        );
        assert!(
            timestamps.windows(2).all(|w| w[0] < w[1]),
            "index must be strictly increasing"
        );
        Self { timestamps, values }
    }

    /// Number of timestamps in the series.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamp index, strictly increasing.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// The MW values, parallel to the index.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over (timestamp, MW) pairs.
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &load_mw)| Observation { timestamp, load_mw })
    }

    /// Largest value in the series (0.0 for an empty series).
    pub fn peak_mw(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}
