//! predai-augurs
//!
//! `Forecaster` backed by augurs.
//!
//! # Algorithm
//!
//! - With at least two days of data: MSTL with a daily season (plus a weekly
//!   season once two full weeks are available) and an AutoETS trend model.
//! - With less: plain non-seasonal AutoETS.
//!
//! Missing values are linearly interpolated before fitting. The models are
//! univariate: requests carrying regressors, lags or a holiday country are
//! rejected with `Unsupported`, and the orchestrator leaves them out.
#![warn(missing_docs)]

use async_trait::async_trait;
use augurs::{
    ets::AutoETS,
    forecaster::{Forecaster as AugursPipeline, Transformer, transforms::LinearInterpolator},
    mstl::MSTLModel,
};
use chrono::Duration;
use predai_core::connector::{ForecastRequest, Forecaster};
use predai_core::{ForecastRow, Point, PredaiError};

/// Minimum number of training points.
pub const MIN_POINTS: usize = 8;

/// Confidence level requested from the models; intervals are discarded.
const CONFIDENCE_LEVEL: f64 = 0.95;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Seasonal periods (in ticks) usable for `n` points at `period_minutes`.
///
/// Empty when fewer than two full days are available.
#[must_use]
pub fn seasonal_periods(n: usize, period_minutes: u32) -> Vec<usize> {
    if period_minutes == 0 || period_minutes > MINUTES_PER_DAY {
        return Vec::new();
    }
    let daily = (MINUTES_PER_DAY / period_minutes) as usize;
    let weekly = daily * 7;
    let mut periods = Vec::new();
    if daily > 1 && n >= 2 * daily {
        periods.push(daily);
    }
    if n >= 2 * weekly {
        periods.push(weekly);
    }
    periods
}

/// In-sample and out-of-sample point forecasts.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitted {
    /// One value per training point.
    pub in_sample: Vec<f64>,
    /// `horizon` future values.
    pub future: Vec<f64>,
}

fn interpolator() -> Vec<Box<dyn Transformer>> {
    vec![Box::new(LinearInterpolator::default())]
}

fn model_err(stage: &str, e: impl std::fmt::Display) -> PredaiError {
    PredaiError::forecast(format!("{stage}: {e}"))
}

/// Fit a model to `values` and predict `horizon` ticks ahead.
///
/// # Errors
/// Returns `Forecast` when there are fewer than [`MIN_POINTS`] values or the
/// model fails to fit.
pub fn fit_predict(values: &[f64], periods: Vec<usize>, horizon: usize) -> Result<Fitted, PredaiError> {
    if values.len() < MIN_POINTS {
        return Err(PredaiError::forecast(format!(
            "insufficient data: need at least {MIN_POINTS} points, got {}",
            values.len()
        )));
    }
    let values: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { *v } else { f64::NAN })
        .collect();

    let (in_sample, future) = if periods.is_empty() {
        let mut f = AugursPipeline::new(AutoETS::non_seasonal()).with_transformers(interpolator());
        f.fit(&values).map_err(|e| model_err("ETS fit", e))?;
        let hist = f
            .predict_in_sample(CONFIDENCE_LEVEL)
            .map_err(|e| model_err("ETS in-sample", e))?;
        let fut = f
            .predict(horizon, CONFIDENCE_LEVEL)
            .map_err(|e| model_err("ETS predict", e))?;
        (hist.point, fut.point)
    } else {
        let ets = AutoETS::non_seasonal().into_trend_model();
        let mstl = MSTLModel::new(periods, ets);
        let mut f = AugursPipeline::new(mstl).with_transformers(interpolator());
        f.fit(&values).map_err(|e| model_err("MSTL fit", e))?;
        let hist = f
            .predict_in_sample(CONFIDENCE_LEVEL)
            .map_err(|e| model_err("MSTL in-sample", e))?;
        let fut = f
            .predict(horizon, CONFIDENCE_LEVEL)
            .map_err(|e| model_err("MSTL predict", e))?;
        (hist.point, fut.point)
    };

    Ok(Fitted { in_sample, future })
}

/// Build engine output rows from the training series and fitted values.
///
/// Missing in-sample predictions fall back to the actual value.
#[must_use]
pub fn to_rows(series: &[Point], fitted: &Fitted, period_minutes: u32) -> Vec<ForecastRow> {
    let mut rows: Vec<ForecastRow> = series
        .iter()
        .enumerate()
        .map(|(i, p)| ForecastRow {
            ts: p.ts,
            predicted: fitted
                .in_sample
                .get(i)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(p.value),
            actual: Some(p.value),
        })
        .collect();
    if let Some(last) = series.last() {
        let step = Duration::minutes(i64::from(period_minutes));
        let mut ts = last.ts;
        for v in &fitted.future {
            ts += step;
            rows.push(ForecastRow {
                ts,
                predicted: *v,
                actual: None,
            });
        }
    }
    rows
}

/// augurs-backed [`Forecaster`].
///
/// Model fitting is CPU bound and runs on Tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AugursForecaster;

impl AugursForecaster {
    /// Create the forecaster.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Forecaster for AugursForecaster {
    fn name(&self) -> &'static str {
        "predai-augurs"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "predai_augurs::forecast",
            skip(self, req),
            fields(points = req.series.len(), period = req.period_minutes, horizon = req.future_periods),
        )
    )]
    async fn forecast(&self, req: ForecastRequest) -> Result<Vec<ForecastRow>, PredaiError> {
        if req.period_minutes == 0 {
            return Err(PredaiError::InvalidArg("period_minutes must be > 0".into()));
        }
        req.ensure_supported(self.features())?;

        let periods = seasonal_periods(req.series.len(), req.period_minutes);
        let values: Vec<f64> = req.series.iter().map(|p| p.value).collect();
        let horizon = req.future_periods;
        let fitted = tokio::task::spawn_blocking(move || fit_predict(&values, periods, horizon))
            .await
            .map_err(|e| PredaiError::forecast(format!("model task failed: {e}")))??;

        Ok(to_rows(&req.series, &fitted, req.period_minutes))
    }
}
