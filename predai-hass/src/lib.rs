//! predai-hass
//!
//! Home Assistant REST connector implementing `HistorySource` and
//! `StatePublisher` on top of `reqwest`.
//!
//! - `GET /api/history/period/<start>` for raw sample history
//! - `GET /api/states/<entity_id>` to read a state
//! - `POST /api/states/<entity_id>` to publish a state with attributes
#![warn(missing_docs)]

mod builder;

pub use builder::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HassClientBuilder};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use predai_core::connector::{HistorySource, StatePublisher};
use predai_core::timeseries::timestamp::{days_before, format_ha};
use predai_core::{Capability, History, PredaiError, RawSample, StateUpdate};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// Home Assistant REST client.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct HassClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSample {
    #[serde(default)]
    state: Option<String>,
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WireState {
    #[serde(default)]
    state: Option<String>,
}

fn map_transport_err(e: &reqwest::Error, capability: Capability) -> PredaiError {
    if e.is_timeout() {
        PredaiError::provider_timeout(HassClient::NAME, capability.as_str())
    } else if e.is_decode() {
        PredaiError::connector(HassClient::NAME, format!("{capability}: invalid response body: {e}"))
    } else {
        PredaiError::connector(HassClient::NAME, format!("{capability}: {e}"))
    }
}

fn status_err(status: StatusCode, capability: Capability) -> PredaiError {
    PredaiError::connector(HassClient::NAME, format!("{capability}: HTTP {status}"))
}

impl HassClient {
    /// Connector name used in logs and errors.
    pub const NAME: &'static str = "predai-hass";

    /// Build `<base>/api/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PredaiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PredaiError::Config(format!("URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl HistorySource for HassClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "predai_hass::history", skip(self))
    )]
    async fn history(
        &self,
        entity_id: &str,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<History, PredaiError> {
        let start = days_before(now, days)?;
        let start_s = format_ha(start);
        let mut url = self.endpoint(&["history", "period", &start_s])?;
        url.query_pairs_mut()
            .append_pair("filter_entity_id", entity_id)
            .append_pair("end_time", &format_ha(now));

        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, Capability::History))?;
        if !resp.status().is_success() {
            return Err(status_err(resp.status(), Capability::History));
        }
        let lists: Vec<Vec<WireSample>> = resp
            .json()
            .await
            .map_err(|e| map_transport_err(&e, Capability::History))?;

        let samples: Vec<RawSample> = lists
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|w| RawSample::new(w.state.unwrap_or_default(), w.last_updated))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(entity_id, samples = samples.len(), "fetched history");

        Ok(History::from_samples(samples, start, now))
    }
}

#[async_trait]
impl StatePublisher for HassClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn state(&self, entity_id: &str) -> Result<Option<String>, PredaiError> {
        let url = self.endpoint(&["states", entity_id])?;
        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, Capability::GetState))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_err(resp.status(), Capability::GetState));
        }
        let body: WireState = resp
            .json()
            .await
            .map_err(|e| map_transport_err(&e, Capability::GetState))?;
        Ok(body.state)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "predai_hass::set_state", skip(self, update))
    )]
    async fn set_state(&self, entity_id: &str, update: StateUpdate) -> Result<(), PredaiError> {
        let url = self.endpoint(&["states", entity_id])?;
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&update)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, Capability::SetState))?;
        if !resp.status().is_success() {
            return Err(status_err(resp.status(), Capability::SetState));
        }
        Ok(())
    }
}
