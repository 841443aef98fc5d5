//! Configuration types shared across the orchestrator and the binary.

use serde::{Deserialize, Serialize};

const fn default_update_every() -> u64 {
    30
}
const fn default_days() -> u32 {
    7
}
const fn default_interval() -> u32 {
    30
}
const fn default_future_periods() -> usize {
    96
}
const fn default_true() -> bool {
    true
}
const fn default_reset_low() -> f64 {
    1.0
}
const fn default_reset_high() -> f64 {
    2.0
}

/// Root configuration: how often to run and which sensors to forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredaiConfig {
    /// Minutes to wait between two full passes over all sensors.
    #[serde(default = "default_update_every")]
    pub update_every: u64,
    /// IANA timezone used for daily resets and published timestamps (UTC when absent).
    #[serde(default)]
    pub timezone: Option<String>,
    /// Per-sensor settings, processed in order.
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

impl Default for PredaiConfig {
    fn default() -> Self {
        Self {
            update_every: default_update_every(),
            timezone: None,
            sensors: Vec::new(),
        }
    }
}

/// A single string or a list of strings.
///
/// Accepts both `subtract = "sensor.car"` and `subtract = ["sensor.a", "sensor.b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single entry.
    One(String),
    /// Several entries, in order.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Borrow the entries as a list regardless of the written form.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v,
        }
    }
}

/// Auxiliary series supplied to the forecasting engine as a regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateConfig {
    /// Entity id of the covariate series.
    pub name: String,
    /// Treat the covariate as a cumulative meter counter.
    #[serde(default)]
    pub incrementing: bool,
    /// Days of history to fetch; defaults to the owning sensor's `days`.
    #[serde(default)]
    pub days: Option<u32>,
}

/// Settings for one forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Entity id of the primary series. Sensors without a name are skipped.
    #[serde(default)]
    pub name: Option<String>,
    /// Sibling counter series subtracted from the primary series.
    #[serde(default)]
    pub subtract: Option<OneOrMany>,
    /// Days of history to fetch.
    #[serde(default = "default_days")]
    pub days: u32,
    /// Days of history included in the published attributes; defaults to `days`.
    #[serde(default)]
    pub export_days: Option<u32>,
    /// Treat the raw series as a cumulative meter counter.
    #[serde(default)]
    pub incrementing: bool,
    /// Reset published running totals at local midnight.
    #[serde(default)]
    pub reset_daily: bool,
    /// Cadence of the uniform series in minutes.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Unit published with the prediction.
    #[serde(default)]
    pub units: String,
    /// Number of future periods to forecast.
    #[serde(default = "default_future_periods")]
    pub future_periods: usize,
    /// Persist resampled history in the dedup store.
    #[serde(default = "default_true")]
    pub database: bool,
    /// A drop below this value (from above `reset_high`) is a counter reset.
    #[serde(default = "default_reset_low")]
    pub reset_low: f64,
    /// See `reset_low`.
    #[serde(default = "default_reset_high")]
    pub reset_high: f64,
    /// Largest accepted jump between two raw readings; `0` disables the filter.
    #[serde(default)]
    pub max_increment: f64,
    /// Autoregression lags handed to the forecasting engine.
    #[serde(default)]
    pub n_lags: usize,
    /// Country code for holiday regressors, if the engine supports them.
    #[serde(default)]
    pub country: Option<String>,
    /// Regressor series.
    #[serde(default)]
    pub covariates: Vec<CovariateConfig>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: None,
            subtract: None,
            days: default_days(),
            export_days: None,
            incrementing: false,
            reset_daily: false,
            interval: default_interval(),
            units: String::new(),
            future_periods: default_future_periods(),
            database: true,
            reset_low: default_reset_low(),
            reset_high: default_reset_high(),
            max_increment: 0.0,
            n_lags: 0,
            country: None,
            covariates: Vec::new(),
        }
    }
}

impl SensorConfig {
    /// Convenience constructor for a named sensor with default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Days of history published alongside the prediction.
    #[must_use]
    pub fn export_days(&self) -> u32 {
        self.export_days.unwrap_or(self.days)
    }

    /// Entity ids of the series to subtract, in order.
    #[must_use]
    pub fn subtract_names(&self) -> &[String] {
        self.subtract.as_ref().map_or(&[], OneOrMany::as_slice)
    }

    /// Entity id the prediction is published under (`<name>_prediction`).
    #[must_use]
    pub fn prediction_entity(&self) -> Option<String> {
        self.name.as_ref().map(|n| format!("{n}_prediction"))
    }
}
