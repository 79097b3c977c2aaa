//! Time-series models shared by the aligner and the chart renderer

use chrono::{DateTime, Utc};

/// A single timestamped value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Timestamp as epoch milliseconds, the unit all chart math runs in
    pub fn millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// A labeled sequence of samples, ordered however the caller supplied them
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub unit: Option<String>,
    pub points: Vec<Sample>,
}

impl Series {
    pub fn new(label: impl Into<String>, unit: Option<&str>, points: Vec<Sample>) -> Self {
        Self {
            label: label.into(),
            unit: unit.map(|u| u.to_string()),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Copy of the points sorted ascending by timestamp.
    /// The stored order is left untouched.
    pub fn sorted_points(&self) -> Vec<Sample> {
        sorted_copy(&self.points)
    }

    /// Copy of the whole series with its points sorted
    pub fn sorted(&self) -> Series {
        Series {
            label: self.label.clone(),
            unit: self.unit.clone(),
            points: self.sorted_points(),
        }
    }

    /// Latest sample by timestamp
    pub fn last(&self) -> Option<&Sample> {
        self.points.iter().max_by_key(|p| p.timestamp)
    }
}

/// Stable ascending sort of a sample slice into a fresh vector
pub fn sorted_copy(points: &[Sample]) -> Vec<Sample> {
    let mut out = points.to_vec();
    out.sort_by_key(|p| p.timestamp);
    out
}
