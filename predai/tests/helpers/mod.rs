#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use predai::{Predai, PredaiBuilder};
use predai_mock::{MemoryStore, MockForecaster, MockHass, MockHassController};

pub use predai_mock::fixtures::{meter_samples, sensor_samples, ts};

pub struct Rig {
    pub predai: Predai,
    pub hass: MockHassController,
    pub forecaster: MockForecaster,
    pub store: MemoryStore,
}

pub fn rig() -> Rig {
    rig_with(|b| b)
}

pub fn rig_with(customize: impl FnOnce(PredaiBuilder) -> PredaiBuilder) -> Rig {
    rig_with_parts(MockForecaster::new(), customize)
}

pub fn rig_with_forecaster(forecaster: MockForecaster) -> Rig {
    rig_with_parts(forecaster, |b| b)
}

fn rig_with_parts(
    forecaster: MockForecaster,
    customize: impl FnOnce(PredaiBuilder) -> PredaiBuilder,
) -> Rig {
    let (hass, ctl) = MockHass::new_with_controller("mock-hass");
    let store = MemoryStore::new();
    let builder = Predai::builder()
        .with_hass(hass)
        .with_forecaster(Arc::new(forecaster.clone()))
        .with_store(Arc::new(store.clone()));
    let predai = customize(builder).build().unwrap();
    Rig {
        predai,
        hass: ctl,
        forecaster,
        store,
    }
}

/// Midnight after one day of five-minute meter samples.
pub fn day_end() -> DateTime<Utc> {
    ts("2024-01-02T00:00:00Z")
}

pub fn day_start() -> DateTime<Utc> {
    ts("2024-01-01T00:00:00Z")
}
