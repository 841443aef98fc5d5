use core::fmt;
use serde::{Deserialize, Serialize};

/// High-level capability labels for collaborator calls, errors, and telemetry.
///
/// Each variant maps to one collaborator operation so timeouts and failures
/// can be labelled consistently in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Raw sample history for one series.
    History,
    /// Point-in-time state read.
    GetState,
    /// State publication with attributes.
    SetState,
    /// Model training and prediction.
    Forecast,
    /// Dedup store access (schema, reads, inserts).
    Store,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::GetState => "get-state",
            Self::SetState => "set-state",
            Self::Forecast => "forecast",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
