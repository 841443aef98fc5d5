//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::PredaiError;

/// A sensor whose pipeline failed during a pass, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorFailure {
    /// Entity id of the failed sensor.
    pub sensor: String,
    /// The error that stopped its pipeline.
    pub error: PredaiError,
}

/// Summary of one pass over all configured sensors.
///
/// A failure in one sensor never prevents the others from running; the
/// report records the outcome of each so callers can log or alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunReport {
    /// Prediction entities that received a new state.
    pub published: Vec<String>,
    /// Sensors skipped (no name, or no data to train on).
    pub skipped: Vec<String>,
    /// Sensors whose pipeline returned an error.
    pub failed: Vec<SensorFailure>,
}

impl RunReport {
    /// True when no sensor failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
