//! Foundational data types plus re-exports from `predai-types`.
// Consolidated re-exports so downstream crates can depend on `predai-core` only

pub use predai_types::{Capability, PredaiError};
pub use predai_types::{CovariateConfig, OneOrMany, PredaiConfig, SensorConfig};
pub use predai_types::{RunReport, SensorFailure};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeseries::timestamp::parse_timestamp;

/// One raw reading as delivered by the history API.
///
/// `state` is kept as the original string: sensors report non-numeric states
/// such as `unavailable` which the resampler has to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// Reported state, usually a decimal number.
    pub state: String,
    /// ISO-8601 timestamp with UTC offset.
    pub last_updated: String,
}

impl RawSample {
    /// Build a raw sample from anything string-like.
    pub fn new(state: impl Into<String>, last_updated: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            last_updated: last_updated.into(),
        }
    }

    /// Build a raw sample for a numeric reading at `ts`.
    #[must_use]
    pub fn at(ts: DateTime<Utc>, value: f64) -> Self {
        Self {
            state: value.to_string(),
            last_updated: ts.to_rfc3339(),
        }
    }
}

/// One point of a uniform series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Tick timestamp (minute resolution).
    pub ts: DateTime<Utc>,
    /// Value at the tick.
    pub value: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(ts: DateTime<Utc>, value: f64) -> Self {
        Self { ts, value }
    }
}

/// Raw samples for one series plus the window they cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    /// Samples in ascending time order.
    pub samples: Vec<RawSample>,
    /// First sample timestamp, or the requested window start.
    pub start: DateTime<Utc>,
    /// Last sample timestamp, or the requested window end.
    pub end: DateTime<Utc>,
}

impl History {
    /// An empty history spanning the requested window.
    #[must_use]
    pub const fn empty(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            samples: Vec::new(),
            start,
            end,
        }
    }

    /// Wrap fetched samples, narrowing the window to the first and last
    /// parseable `last_updated`.
    ///
    /// Falls back to the requested bounds when a bound cannot be parsed.
    #[must_use]
    pub fn from_samples(
        samples: Vec<RawSample>,
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
    ) -> Self {
        let start = samples
            .first()
            .and_then(|s| parse_timestamp(&s.last_updated))
            .unwrap_or(requested_start);
        let end = samples
            .last()
            .and_then(|s| parse_timestamp(&s.last_updated))
            .unwrap_or(requested_end);
        Self {
            samples,
            start,
            end,
        }
    }

    /// True when the fetch returned no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One row of forecasting engine output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Timestamp on the engine's clock.
    pub ts: DateTime<Utc>,
    /// Predicted value.
    pub predicted: f64,
    /// Historical actual value, absent for future rows.
    pub actual: Option<f64>,
}

/// State plus attributes to publish for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Published state value.
    pub state: serde_json::Value,
    /// Open attribute map (units, series, timestamps).
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl StateUpdate {
    /// A state without attributes.
    pub fn new(state: impl Into<serde_json::Value>) -> Self {
        Self {
            state: state.into(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Add or replace one attribute.
    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
