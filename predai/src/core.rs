use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use predai_core::connector::{Forecaster, HistorySource, StatePublisher};
use predai_core::{DedupStore, PredaiError};

/// Default bound on every collaborator call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(240);
/// Entity whose state records the last completed pass.
pub const DEFAULT_HEARTBEAT_ENTITY: &str = "sensor.predai_last_run";

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) provider_timeout: Duration,
    pub(crate) timezone: Tz,
    pub(crate) heartbeat_entity: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            timezone: Tz::UTC,
            heartbeat_entity: DEFAULT_HEARTBEAT_ENTITY.to_string(),
        }
    }
}

/// Orchestrator that runs the forecast pipeline for configured sensors.
pub struct Predai {
    pub(crate) history: Arc<dyn HistorySource>,
    pub(crate) publisher: Arc<dyn StatePublisher>,
    pub(crate) forecaster: Arc<dyn Forecaster>,
    pub(crate) store: Option<Arc<dyn DedupStore>>,
    pub(crate) cfg: Settings,
}

/// Builder for constructing a [`Predai`] orchestrator.
#[derive(Default)]
pub struct PredaiBuilder {
    history: Option<Arc<dyn HistorySource>>,
    publisher: Option<Arc<dyn StatePublisher>>,
    forecaster: Option<Arc<dyn Forecaster>>,
    store: Option<Arc<dyn DedupStore>>,
    cfg: Settings,
}

impl PredaiBuilder {
    /// Create a new builder with defaults: no collaborators, 240 s provider
    /// timeout, UTC, heartbeat on `sensor.predai_last_run`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source of raw sample history.
    #[must_use]
    pub fn with_history_source(mut self, source: Arc<dyn HistorySource>) -> Self {
        self.history = Some(source);
        self
    }

    /// Register the collaborator that reads and publishes entity states.
    #[must_use]
    pub fn with_state_publisher(mut self, publisher: Arc<dyn StatePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Register one collaborator as both history source and state publisher.
    #[must_use]
    pub fn with_hass<H>(self, hass: Arc<H>) -> Self
    where
        H: HistorySource + StatePublisher + 'static,
    {
        let source: Arc<dyn HistorySource> = hass.clone();
        let publisher: Arc<dyn StatePublisher> = hass;
        self.with_history_source(source).with_state_publisher(publisher)
    }

    /// Register the forecasting engine.
    #[must_use]
    pub fn with_forecaster(mut self, forecaster: Arc<dyn Forecaster>) -> Self {
        self.forecaster = Some(forecaster);
        self
    }

    /// Register the dedup store. Without one, sensors with `database = true`
    /// train on freshly fetched history only.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DedupStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Bound every collaborator call.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Zone used for daily resets and published timestamps.
    #[must_use]
    pub const fn timezone(mut self, tz: Tz) -> Self {
        self.cfg.timezone = tz;
        self
    }

    /// Entity used for the heartbeat.
    #[must_use]
    pub fn heartbeat_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.cfg.heartbeat_entity = entity_id.into();
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the history source, state publisher or
    /// forecaster is missing, or the provider timeout is zero.
    pub fn build(self) -> Result<Predai, PredaiError> {
        let missing = |what: &str| {
            PredaiError::InvalidArg(format!("no {what} registered; add one via with_{what}(...)"))
        };
        let history = self.history.ok_or_else(|| missing("history_source"))?;
        let publisher = self.publisher.ok_or_else(|| missing("state_publisher"))?;
        let forecaster = self.forecaster.ok_or_else(|| missing("forecaster"))?;
        if self.cfg.provider_timeout.is_zero() {
            return Err(PredaiError::InvalidArg(
                "provider timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Predai {
            history,
            publisher,
            forecaster,
            store: self.store,
            cfg: self.cfg,
        })
    }
}

impl Predai {
    /// Start building a new `Predai` instance.
    #[must_use]
    pub fn builder() -> PredaiBuilder {
        PredaiBuilder::new()
    }

    /// Zone used for daily resets and published timestamps.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.cfg.timezone
    }

    /// Entity used for the heartbeat.
    #[must_use]
    pub fn heartbeat_entity(&self) -> &str {
        &self.cfg.heartbeat_entity
    }

    /// Wrap a collaborator future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "predai::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, PredaiError>
    where
        Fut: core::future::Future<Output = Result<T, PredaiError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(PredaiError::provider_timeout(connector_name, capability)))
    }
}
