//! predai-specific data transfer objects and configuration primitives shared by
//! the core, the connectors, and the orchestrator.
#![warn(missing_docs)]

mod capability;
/// Sensor and runtime configuration as read from the configuration file.
pub mod config;
mod error;
mod reports;

pub use capability::Capability;
pub use config::{CovariateConfig, OneOrMany, PredaiConfig, SensorConfig};
pub use error::PredaiError;
pub use reports::{RunReport, SensorFailure};
