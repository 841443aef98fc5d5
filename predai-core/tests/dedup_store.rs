mod helpers;

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use predai_core::{DedupStore, Point, PredaiError, table_name};

use helpers::{t0, values};

#[derive(Default)]
struct FakeStore {
    tables: Mutex<BTreeMap<String, BTreeMap<DateTime<Utc>, f64>>>,
    inserts: Mutex<usize>,
}

#[async_trait]
impl DedupStore for FakeStore {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn ensure_table(&self, series_id: &str) -> Result<(), PredaiError> {
        let t = table_name(series_id)?;
        self.tables.lock().unwrap().entry(t).or_default();
        Ok(())
    }

    async fn read_all(&self, series_id: &str) -> Result<Vec<Point>, PredaiError> {
        let t = table_name(series_id)?;
        let tables = self.tables.lock().unwrap();
        let table = tables.get(&t).ok_or_else(|| PredaiError::store("missing table"))?;
        Ok(table.iter().map(|(ts, v)| Point::new(*ts, *v)).collect())
    }

    async fn insert(&self, series_id: &str, point: Point) -> Result<bool, PredaiError> {
        let t = table_name(series_id)?;
        *self.inserts.lock().unwrap() += 1;
        let mut tables = self.tables.lock().unwrap();
        let table = tables.get_mut(&t).ok_or_else(|| PredaiError::store("missing table"))?;
        if table.contains_key(&point.ts) {
            return Ok(false);
        }
        table.insert(point.ts, point.value);
        Ok(true)
    }
}

fn at(min: i64, v: f64) -> Point {
    Point::new(t0() + Duration::minutes(min), v)
}

#[tokio::test]
async fn append_new_only_writes_unknown_timestamps() {
    let store = FakeStore::default();
    store.ensure_table("sensor.load").await.unwrap();
    store.insert("sensor.load", at(0, 1.0)).await.unwrap();
    let known = store.read_all("sensor.load").await.unwrap();

    let merged = store
        .append_new("sensor.load", &[at(0, 99.0), at(60, 3.0), at(30, 2.0)], known)
        .await
        .unwrap();

    assert_eq!(values(&merged), vec![1.0, 2.0, 3.0]);
    assert_eq!(*store.inserts.lock().unwrap(), 3);
    assert_eq!(store.read_all("sensor.load").await.unwrap(), merged);
}

#[tokio::test]
async fn append_new_is_idempotent() {
    let store = FakeStore::default();
    store.ensure_table("sensor.load").await.unwrap();
    let batch = [at(0, 1.0), at(30, 2.0)];
    let first = store.append_new("sensor.load", &batch, Vec::new()).await.unwrap();
    let known = store.read_all("sensor.load").await.unwrap();
    let second = store.append_new("sensor.load", &batch, known).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(*store.inserts.lock().unwrap(), 2);
}

#[test]
fn table_names_are_sanitised() {
    assert_eq!(table_name("sensor.x").unwrap(), "sensor_x");
    assert_eq!(table_name("sensor.a-b c").unwrap(), "sensor_a_b_c");
    assert!(matches!(table_name(""), Err(PredaiError::InvalidArg(_))));
}
