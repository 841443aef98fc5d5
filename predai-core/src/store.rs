//! Append-only persistence of uniform series, keyed by timestamp.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Point, PredaiError};

/// Map a series id to a table name.
///
/// Any character outside `[A-Za-z0-9_]` becomes `_`, so `sensor.x` maps to
/// `sensor_x`.
///
/// # Errors
/// Returns `InvalidArg` for an empty id.
///
/// ```
/// use predai_core::store::table_name;
/// assert_eq!(table_name("sensor.house_load").unwrap(), "sensor_house_load");
/// assert!(table_name("").is_err());
/// ```
pub fn table_name(series_id: &str) -> Result<String, PredaiError> {
    if series_id.is_empty() {
        return Err(PredaiError::InvalidArg("series id must not be empty".into()));
    }
    Ok(series_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect())
}

/// Deduplicating series store.
///
/// Each logical series lives in its own table; a timestamp is stored at most
/// once and re-inserting it is a silent no-op.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// A short, stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Create the table for `series_id` if it does not exist yet.
    async fn ensure_table(&self, series_id: &str) -> Result<(), PredaiError>;

    /// Every stored point of `series_id`, ordered by timestamp.
    async fn read_all(&self, series_id: &str) -> Result<Vec<Point>, PredaiError>;

    /// Persist one point. Returns `false` when the timestamp was already stored.
    async fn insert(&self, series_id: &str, point: Point) -> Result<bool, PredaiError>;

    /// Persist every `candidate` whose timestamp is not in `known` and return
    /// the union, ordered by timestamp.
    ///
    /// Points already in `known` keep their stored value.
    async fn append_new(
        &self,
        series_id: &str,
        candidate: &[Point],
        known: Vec<Point>,
    ) -> Result<Vec<Point>, PredaiError> {
        let mut merged = into_index(known);
        for p in candidate {
            if merged.contains_key(&p.ts) {
                continue;
            }
            self.insert(series_id, *p).await?;
            merged.insert(p.ts, p.value);
        }
        Ok(from_index(merged))
    }
}

/// Index points by timestamp; later duplicates replace earlier ones.
#[must_use]
pub fn into_index(points: Vec<Point>) -> BTreeMap<DateTime<Utc>, f64> {
    points.into_iter().map(|p| (p.ts, p.value)).collect()
}

/// Rebuild an ordered series from an index.
#[must_use]
pub fn from_index(index: BTreeMap<DateTime<Utc>, f64>) -> Vec<Point> {
    index.into_iter().map(|(ts, value)| Point::new(ts, value)).collect()
}
