use std::time::Duration;

use predai_core::PredaiError;
use url::Url;

use crate::HassClient;

/// Default Home Assistant URL inside a supervisor add-on.
pub const DEFAULT_BASE_URL: &str = "http://supervisor/core";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(240);

/// Builder for [`HassClient`].
#[derive(Debug, Clone)]
pub struct HassClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for HassClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HassClientBuilder {
    /// Root URL of the Home Assistant instance (the `/api` prefix is added per call).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Long-lived access token sent as a bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `Config` for an unparseable base URL and `Connector` when the
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<HassClient, PredaiError> {
        let trimmed = self.base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| PredaiError::Config(format!("invalid Home Assistant URL {trimmed}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PredaiError::Config(format!(
                "Home Assistant URL cannot be a base: {trimmed}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| PredaiError::connector(HassClient::NAME, e.to_string()))?;
        Ok(HassClient {
            http,
            base_url,
            token: self.token,
        })
    }
}

impl HassClient {
    /// Start building a client with the add-on defaults.
    #[must_use]
    pub fn builder() -> HassClientBuilder {
        HassClientBuilder::default()
    }
}
