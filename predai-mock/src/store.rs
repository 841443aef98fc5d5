use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use predai_core::store::{DedupStore, table_name};
use predai_core::{Point, PredaiError};

#[derive(Default)]
struct InternalState {
    tables: HashMap<String, BTreeMap<DateTime<Utc>, f64>>,
    failure: Option<PredaiError>,
}

/// In-memory [`DedupStore`] with a failure switch.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InternalState>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `err` (`None` restores normal behavior).
    pub async fn fail_with(&self, err: Option<PredaiError>) {
        self.state.lock().await.failure = err;
    }

    /// Stored points of `series_id`, empty when the table does not exist.
    pub async fn snapshot(&self, series_id: &str) -> Vec<Point> {
        let Ok(t) = table_name(series_id) else {
            return Vec::new();
        };
        let guard = self.state.lock().await;
        guard
            .tables
            .get(&t)
            .map(|rows| rows.iter().map(|(ts, v)| Point::new(*ts, *v)).collect())
            .unwrap_or_default()
    }
}

fn check(state: &InternalState) -> Result<(), PredaiError> {
    state.failure.clone().map_or(Ok(()), Err)
}

#[async_trait]
impl DedupStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_table(&self, series_id: &str) -> Result<(), PredaiError> {
        let t = table_name(series_id)?;
        let mut guard = self.state.lock().await;
        check(&guard)?;
        guard.tables.entry(t).or_default();
        Ok(())
    }

    async fn read_all(&self, series_id: &str) -> Result<Vec<Point>, PredaiError> {
        let t = table_name(series_id)?;
        let guard = self.state.lock().await;
        check(&guard)?;
        let rows = guard
            .tables
            .get(&t)
            .ok_or_else(|| PredaiError::store(format!("no such table: {t}")))?;
        Ok(rows.iter().map(|(ts, v)| Point::new(*ts, *v)).collect())
    }

    async fn insert(&self, series_id: &str, point: Point) -> Result<bool, PredaiError> {
        let t = table_name(series_id)?;
        let mut guard = self.state.lock().await;
        check(&guard)?;
        let rows = guard
            .tables
            .get_mut(&t)
            .ok_or_else(|| PredaiError::store(format!("no such table: {t}")))?;
        if rows.contains_key(&point.ts) {
            return Ok(false);
        }
        rows.insert(point.ts, point.value);
        Ok(true)
    }
}
