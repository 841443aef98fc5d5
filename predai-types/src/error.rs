use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the predai workspace.
///
/// This wraps argument validation errors, collaborator-tagged failures,
/// persistence and forecasting failures, and configuration problems.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PredaiError {
    /// The requested capability is not implemented by the target collaborator.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "forecast/regressors").
        capability: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual collaborator returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Collaborator name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A resource or entity could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "state for sensor.x".
        what: String,
    },

    /// An individual collaborator call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Collaborator name that timed out.
        connector: String,
        /// Capability label (e.g. "history", "get-state").
        capability: String,
    },

    /// The dedup store rejected an operation.
    #[error("store error: {msg}")]
    Store {
        /// Human-readable error message.
        msg: String,
    },

    /// The forecasting engine could not train or predict.
    #[error("forecast error: {msg}")]
    Forecast {
        /// Human-readable error message.
        msg: String,
    },

    /// The configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PredaiError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the collaborator name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `Store` error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store { msg: msg.into() }
    }

    /// Helper: build a `Forecast` error.
    pub fn forecast(msg: impl Into<String>) -> Self {
        Self::Forecast { msg: msg.into() }
    }

    /// Returns true for failures that only mean "no data this cycle".
    ///
    /// Timeouts and collaborator transport/decode failures are transient; the
    /// pipeline treats them as an empty result rather than aborting.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ProviderTimeout { .. } | Self::Connector { .. } | Self::NotFound { .. }
        )
    }
}
