//! predai runs the sensor forecasting pipeline against pluggable collaborators.
//!
//! Overview
//! - Fetches raw history through a `HistorySource`, resamples it to a uniform
//!   cadence and reconstructs per-tick deltas for meter counters.
//! - Merges the series with a `DedupStore` so history older than the fetch
//!   window keeps contributing to training.
//! - Subtracts sibling series, joins regressors, and hands the table to a
//!   `Forecaster`.
//! - Reconciles the forecast into running totals or instantaneous values and
//!   publishes it through a `StatePublisher` as `<sensor>_prediction`.
//!
//! Failure handling
//! - Fetch and store failures (including timeouts) shrink the training data
//!   instead of aborting the sensor.
//! - Forecast and publish failures fail the sensor; `run_once` records them
//!   and moves on to the next sensor.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use predai::Predai;
//!
//! let predai = Predai::builder()
//!     .with_hass(Arc::new(hass))
//!     .with_forecaster(Arc::new(AugursForecaster::new()))
//!     .with_store(Arc::new(store))
//!     .build()?;
//!
//! let report = predai.run_once(&config, chrono::Utc::now()).await;
//! predai.mark_run(chrono::Utc::now()).await?;
//! ```
#![warn(missing_docs)]

mod core;
mod heartbeat;
mod pipeline;

pub use crate::core::{DEFAULT_HEARTBEAT_ENTITY, DEFAULT_PROVIDER_TIMEOUT, Predai, PredaiBuilder};
pub use heartbeat::{HEARTBEAT_POLL, WaitOutcome};
pub use pipeline::{PreparedSeries, SensorOutcome, SeriesSpec};

pub use predai_core::{
    CovariateConfig, OneOrMany, PredaiConfig, PredaiError, RunReport, SensorConfig, SensorFailure,
};
