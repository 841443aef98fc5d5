//! predai-store
//!
//! SQLite implementation of `DedupStore`. One table per series with schema
//! `(timestamp TEXT PRIMARY KEY, value REAL)`; duplicate timestamps are
//! absorbed by `ON CONFLICT(timestamp) DO NOTHING`.
#![warn(missing_docs)]

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use predai_core::store::{DedupStore, from_index, into_index, table_name};
use predai_core::{Point, PredaiError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

/// Layout of stored timestamps, e.g. `2024-01-01 00:30:00+00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// SQLite-backed [`DedupStore`].
///
/// Uses a single pooled connection so an in-memory database stays shared and
/// writes are serialized.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn store_err(op: &str, e: &sqlx::Error) -> PredaiError {
    PredaiError::store(format!("{op}: {e}"))
}

fn quoted(series_id: &str) -> Result<String, PredaiError> {
    Ok(format!("\"{}\"", table_name(series_id)?))
}

fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn decode_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl SqliteStore {
    /// Open (creating when missing) the database file at `path`.
    ///
    /// # Errors
    /// Returns `Store` when the file cannot be opened.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, PredaiError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| store_err("open", &e))?;
        Ok(Self { pool })
    }

    /// A private in-memory database.
    ///
    /// # Errors
    /// Returns `Store` when SQLite cannot be initialised.
    pub async fn in_memory() -> Result<Self, PredaiError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| store_err("open", &e))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the pool, flushing pending writes.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DedupStore for SqliteStore {
    fn name(&self) -> &'static str {
        "predai-store"
    }

    async fn ensure_table(&self, series_id: &str) -> Result<(), PredaiError> {
        let table = quoted(series_id)?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (timestamp TEXT PRIMARY KEY, value REAL)"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| store_err("create table", &e))?;
        Ok(())
    }

    async fn read_all(&self, series_id: &str) -> Result<Vec<Point>, PredaiError> {
        let table = quoted(series_id)?;
        let rows = sqlx::query(&format!("SELECT timestamp, value FROM {table}"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_err("read", &e))?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("timestamp").map_err(|e| store_err("read", &e))?;
            let value: Option<f64> = row.try_get("value").map_err(|e| store_err("read", &e))?;
            match (decode_ts(&raw), value) {
                (Some(ts), Some(value)) => points.push(Point::new(ts, value)),
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(series_id, timestamp = %raw, "skipping unreadable stored row");
                }
            }
        }
        // Text order is not time order across offsets; sort on the parsed value.
        points.sort_by_key(|p| p.ts);
        Ok(points)
    }

    async fn insert(&self, series_id: &str, point: Point) -> Result<bool, PredaiError> {
        let table = quoted(series_id)?;
        let done = sqlx::query(&format!(
            "INSERT INTO {table} (timestamp, value) VALUES (?, ?) ON CONFLICT(timestamp) DO NOTHING"
        ))
        .bind(encode_ts(point.ts))
        .bind(point.value)
        .execute(&self.pool)
        .await
        .map_err(|e| store_err("insert", &e))?;
        Ok(done.rows_affected() == 1)
    }

    async fn append_new(
        &self,
        series_id: &str,
        candidate: &[Point],
        known: Vec<Point>,
    ) -> Result<Vec<Point>, PredaiError> {
        let table = quoted(series_id)?;
        let sql = format!(
            "INSERT INTO {table} (timestamp, value) VALUES (?, ?) ON CONFLICT(timestamp) DO NOTHING"
        );
        let mut merged = into_index(known);
        let mut tx = self.pool.begin().await.map_err(|e| store_err("begin", &e))?;
        for p in candidate {
            if merged.contains_key(&p.ts) {
                continue;
            }
            sqlx::query(&sql)
                .bind(encode_ts(p.ts))
                .bind(p.value)
                .execute(&mut *tx)
                .await
                .map_err(|e| store_err("insert", &e))?;
            merged.insert(p.ts, p.value);
        }
        tx.commit().await.map_err(|e| store_err("commit", &e))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(series_id, candidates = candidate.len(), total = merged.len(), "appended new points");

        Ok(from_index(merged))
    }
}
