use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::timeseries::join::{JoinedRow, left_join};
use crate::{ForecastRow, History, Point, PredaiError, StateUpdate};

/// Focused role trait for collaborators that serve raw sample history.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// A short, stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fetch raw samples for `entity_id` covering `days` days up to `now`.
    ///
    /// Implementations narrow the returned window to the samples actually
    /// received (see [`History::from_samples`]).
    async fn history(
        &self,
        entity_id: &str,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<History, PredaiError>;
}

/// Focused role trait for collaborators that read and publish entity states.
#[async_trait]
pub trait StatePublisher: Send + Sync {
    /// A short, stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Read the current state of `entity_id`; `None` when the entity does not exist.
    async fn state(&self, entity_id: &str) -> Result<Option<String>, PredaiError>;

    /// Publish a state and its attributes for `entity_id`.
    async fn set_state(&self, entity_id: &str, update: StateUpdate) -> Result<(), PredaiError>;
}

/// Training input for a [`Forecaster`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Uniform training series.
    pub series: Vec<Point>,
    /// Named regressor series, aligned to `series` by timestamp.
    pub covariates: BTreeMap<String, Vec<Point>>,
    /// Cadence of `series` in minutes.
    pub period_minutes: u32,
    /// Number of future ticks to predict.
    pub future_periods: usize,
    /// Autoregression lags (0 disables).
    pub n_lags: usize,
    /// Country code for holiday effects, if supported by the engine.
    pub country: Option<String>,
}

impl ForecastRequest {
    /// A request without regressors or holidays.
    #[must_use]
    pub const fn new(series: Vec<Point>, period_minutes: u32, future_periods: usize) -> Self {
        Self {
            series,
            covariates: BTreeMap::new(),
            period_minutes,
            future_periods,
            n_lags: 0,
            country: None,
        }
    }

    /// Names of the regressor columns, in column order.
    #[must_use]
    pub fn regressor_names(&self) -> Vec<&str> {
        self.covariates.keys().map(String::as_str).collect()
    }

    /// The training table: one row per training point with each regressor
    /// left-joined on timestamp.
    #[must_use]
    pub fn training_table(&self) -> Vec<JoinedRow> {
        left_join(&self.series, &self.covariates)
    }

    /// Optional inputs this request uses, as `forecast/...` capability labels.
    #[must_use]
    pub fn requested_features(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.covariates.is_empty() {
            out.push(ForecastFeatures::REGRESSORS);
        }
        if self.n_lags > 0 {
            out.push(ForecastFeatures::LAGS);
        }
        if self.country.is_some() {
            out.push(ForecastFeatures::HOLIDAYS);
        }
        out
    }

    /// Fail with `Unsupported` for the first requested input `features` lacks.
    ///
    /// # Errors
    /// Returns [`PredaiError::Unsupported`] naming the capability.
    pub fn ensure_supported(&self, features: ForecastFeatures) -> Result<(), PredaiError> {
        match features.missing(self.requested_features()).first() {
            Some(cap) => Err(PredaiError::unsupported(*cap)),
            None => Ok(()),
        }
    }
}

/// Optional inputs a [`Forecaster`] can make use of beyond the training series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForecastFeatures {
    /// Named regressor series joined onto the training table.
    pub regressors: bool,
    /// Autoregression lags (`n_lags`).
    pub lags: bool,
    /// Country holiday effects.
    pub holidays: bool,
}

impl ForecastFeatures {
    /// Capability label for regressors.
    pub const REGRESSORS: &'static str = "forecast/regressors";
    /// Capability label for autoregression lags.
    pub const LAGS: &'static str = "forecast/lags";
    /// Capability label for holiday effects.
    pub const HOLIDAYS: &'static str = "forecast/holidays";

    /// Training series only.
    pub const NONE: Self = Self {
        regressors: false,
        lags: false,
        holidays: false,
    };

    /// Every optional input.
    pub const ALL: Self = Self {
        regressors: true,
        lags: true,
        holidays: true,
    };

    /// True when the capability label is supported.
    #[must_use]
    pub fn supports(&self, capability: &str) -> bool {
        match capability {
            Self::REGRESSORS => self.regressors,
            Self::LAGS => self.lags,
            Self::HOLIDAYS => self.holidays,
            _ => false,
        }
    }

    /// The labels in `requested` that are not supported.
    #[must_use]
    pub fn missing(&self, requested: Vec<&'static str>) -> Vec<&'static str> {
        requested.into_iter().filter(|c| !self.supports(c)).collect()
    }
}

/// Focused role trait for forecasting engines.
///
/// The engine is a black box: it consumes a uniform table and returns rows on
/// the same cadence covering the training history (with actuals) followed by
/// `future_periods` predicted ticks.
#[async_trait]
pub trait Forecaster: Send + Sync {
    /// A short, stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Optional inputs the engine uses. Defaults to the training series only.
    fn features(&self) -> ForecastFeatures {
        ForecastFeatures::NONE
    }

    /// Train on `req` and return historic plus future predictions.
    ///
    /// Requests using inputs outside [`Forecaster::features`] are rejected
    /// with `Unsupported`.
    async fn forecast(&self, req: ForecastRequest) -> Result<Vec<ForecastRow>, PredaiError>;
}
