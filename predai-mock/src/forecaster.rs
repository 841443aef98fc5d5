use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use predai_core::connector::{ForecastFeatures, ForecastRequest, Forecaster};
use predai_core::{ForecastRow, JoinedRow, PredaiError};

use crate::MockBehavior;

#[derive(Default)]
struct InternalState {
    behavior: Option<MockBehavior<Vec<ForecastRow>>>,
    requests: Vec<ForecastRequest>,
    tables: Vec<Vec<JoinedRow>>,
}

/// Seasonal-naive forecaster.
///
/// Historic rows echo the training values. Future rows repeat the value one
/// day earlier when a full day of history exists, otherwise the last value.
/// Supports every optional input unless narrowed with
/// [`MockForecaster::with_features`]; regressors are joined onto the training
/// table, which is recorded per call.
#[derive(Clone)]
pub struct MockForecaster {
    state: Arc<Mutex<InternalState>>,
    features: ForecastFeatures,
}

impl Default for MockForecaster {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            features: ForecastFeatures::ALL,
        }
    }
}

impl MockForecaster {
    /// A forecaster with the default seasonal-naive behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise only `features`; requests using anything else fail with `Unsupported`.
    #[must_use]
    pub const fn with_features(mut self, features: ForecastFeatures) -> Self {
        self.features = features;
        self
    }

    /// The left-joined training table of every accepted request, in call order.
    pub async fn training_tables(&self) -> Vec<Vec<JoinedRow>> {
        self.state.lock().await.tables.clone()
    }

    /// Override the result of every `forecast` call (`None` restores the default).
    pub async fn set_behavior(&self, behavior: Option<MockBehavior<Vec<ForecastRow>>>) {
        self.state.lock().await.behavior = behavior;
    }

    /// Every request received, in call order.
    pub async fn requests(&self) -> Vec<ForecastRequest> {
        self.state.lock().await.requests.clone()
    }
}

/// The rows [`MockForecaster`] produces for `req` by default.
#[must_use]
pub fn seasonal_naive(req: &ForecastRequest) -> Vec<ForecastRow> {
    let mut rows: Vec<ForecastRow> = req
        .series
        .iter()
        .map(|p| ForecastRow {
            ts: p.ts,
            predicted: p.value,
            actual: Some(p.value),
        })
        .collect();
    let Some(last) = req.series.last() else {
        return rows;
    };
    let step = Duration::minutes(i64::from(req.period_minutes.max(1)));
    let season = (1440 / req.period_minutes.max(1)) as usize;
    let n = req.series.len();
    for k in 0..req.future_periods {
        let predicted = if season > 0 && n >= season {
            req.series[n - season + k % season].value
        } else {
            last.value
        };
        rows.push(ForecastRow {
            ts: last.ts + step * (k as i32 + 1),
            predicted,
            actual: None,
        });
    }
    rows
}

#[async_trait]
impl Forecaster for MockForecaster {
    fn name(&self) -> &'static str {
        "mock-forecaster"
    }

    fn features(&self) -> ForecastFeatures {
        self.features
    }

    async fn forecast(&self, req: ForecastRequest) -> Result<Vec<ForecastRow>, PredaiError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            req.ensure_supported(self.features)?;
            guard.tables.push(req.training_table());
            guard.behavior.clone()
        };
        match behavior {
            Some(MockBehavior::Return(rows)) => Ok(rows),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(seasonal_naive(&req)),
        }
    }
}
