use std::time::Duration;

use chrono::{DateTime, Utc};
use predai_core::{Capability, PredaiError, StateUpdate};

use crate::core::Predai;

/// How a wait between passes ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full interval elapsed.
    Elapsed,
    /// The heartbeat entity disappeared; start a new pass now.
    Restart,
}

/// Interval between heartbeat checks while waiting.
pub const HEARTBEAT_POLL: Duration = Duration::from_secs(60);

impl Predai {
    /// Publish the heartbeat state with the completion time of a pass.
    ///
    /// # Errors
    /// Returns the publisher's error.
    pub async fn mark_run(&self, at: DateTime<Utc>) -> Result<(), PredaiError> {
        let stamp = at
            .with_timezone(&self.cfg.timezone)
            .format("%Y-%m-%d %H:%M:%S%:z")
            .to_string();
        let update = StateUpdate::new(stamp).with_attribute("unit_of_measurement", "time");
        Self::provider_call_with_timeout(
            self.publisher.name(),
            Capability::SetState.as_str(),
            self.cfg.provider_timeout,
            self.publisher.set_state(&self.cfg.heartbeat_entity, update),
        )
        .await
    }

    /// True while the heartbeat entity exists.
    ///
    /// # Errors
    /// Returns the publisher's error.
    pub async fn heartbeat_present(&self) -> Result<bool, PredaiError> {
        let state = Self::provider_call_with_timeout(
            self.publisher.name(),
            Capability::GetState.as_str(),
            self.cfg.provider_timeout,
            self.publisher.state(&self.cfg.heartbeat_entity),
        )
        .await?;
        Ok(state.is_some())
    }

    /// Wait `minutes` minutes, checking the heartbeat once a minute.
    ///
    /// Returns [`WaitOutcome::Restart`] as soon as the heartbeat entity is
    /// gone. A failed check is logged and the wait continues.
    pub async fn wait_for_next_run(&self, minutes: u64) -> WaitOutcome {
        for _ in 0..minutes {
            match self.heartbeat_present().await {
                Ok(false) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(entity = %self.cfg.heartbeat_entity, "heartbeat removed; restarting");
                    return WaitOutcome::Restart;
                }
                Ok(true) => {}
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "heartbeat check failed; continuing to wait");
                }
            }
            tokio::time::sleep(HEARTBEAT_POLL).await;
        }
        WaitOutcome::Elapsed
    }
}
