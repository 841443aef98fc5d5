//! predai-core
//!
//! Core types, collaborator traits, and the time-series pipeline stages.
//!
//! - `types`: raw samples, uniform points, history windows, forecast rows.
//! - `connector`: `HistorySource`, `StatePublisher` and `Forecaster` role traits.
//! - `timeseries`: timestamp parsing, resampling with counter accumulation,
//!   subtraction and regressor joins.
//! - `reconcile`: mapping forecasting output back to published series.
//! - `store`: the `DedupStore` trait.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The traits are runtime agnostic (`async_trait`), but every implementation
//! in this workspace and the orchestrator assume a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Collaborator role traits and the forecasting request.
pub mod connector;
/// Forecast reconciliation.
pub mod reconcile;
/// Deduplicating persistence trait.
pub mod store;
/// Time-series utilities for resampling, subtraction and joins.
pub mod timeseries;
pub mod types;

pub use connector::{ForecastFeatures, ForecastRequest, Forecaster, HistorySource, StatePublisher};
pub use reconcile::{ReconcileOptions, Reconciled, reconcile};
pub use store::{DedupStore, table_name};
pub use timeseries::join::{JoinedRow, left_join};
pub use timeseries::resample::{
    CounterParams, CounterState, ResampleOptions, Resampled, parse_state, resample,
};
pub use timeseries::subtract::{subtract, subtract_all};
pub use timeseries::timestamp::{days_before, parse_timestamp, truncate_to_hour, truncate_to_minute};
pub use types::*;
