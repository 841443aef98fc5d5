//! Deterministic in-memory predai collaborators.
//!
//! - [`MockHass`] serves history and entity states and records publishes.
//! - [`MockForecaster`] returns a seasonal-naive forecast.
//! - [`MemoryStore`] is a dedup store that keeps tables in memory.
//!
//! Behaviors are set through async controllers so tests can simulate
//! failures and hangs (for timeout handling).

mod dynamic;
pub mod fixtures;
mod forecaster;
mod store;

pub use dynamic::{HistoryCall, MockBehavior, MockHass, MockHassController};
pub use forecaster::{MockForecaster, seasonal_naive};
pub use store::MemoryStore;
