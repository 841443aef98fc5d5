use chrono::{DateTime, Duration, Utc};
use predai_core::{DedupStore, Point};
use predai_store::SqliteStore;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
}

fn at(min: i64, v: f64) -> Point {
    Point::new(t0() + Duration::minutes(min), v)
}

#[tokio::test]
async fn insert_is_idempotent() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.ensure_table("sensor.load").await.unwrap();
    store.ensure_table("sensor.load").await.unwrap();

    assert!(store.insert("sensor.load", at(0, 1.0)).await.unwrap());
    assert!(!store.insert("sensor.load", at(0, 5.0)).await.unwrap());
    assert_eq!(store.read_all("sensor.load").await.unwrap(), vec![at(0, 1.0)]);
}

#[tokio::test]
async fn append_new_merges_in_time_order() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.ensure_table("sensor.load").await.unwrap();
    store.insert("sensor.load", at(30, 2.0)).await.unwrap();

    let known = store.read_all("sensor.load").await.unwrap();
    let merged = store
        .append_new("sensor.load", &[at(60, 3.0), at(0, 1.0), at(30, 99.0)], known)
        .await
        .unwrap();

    assert_eq!(merged, vec![at(0, 1.0), at(30, 2.0), at(60, 3.0)]);
    assert_eq!(store.read_all("sensor.load").await.unwrap(), merged);

    let again = store
        .append_new("sensor.load", &[at(0, 1.0), at(60, 3.0)], merged.clone())
        .await
        .unwrap();
    assert_eq!(again, merged);
}

#[tokio::test]
async fn tables_are_isolated_per_series() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.ensure_table("sensor.a").await.unwrap();
    store.ensure_table("sensor.b").await.unwrap();
    store.insert("sensor.a", at(0, 1.0)).await.unwrap();
    assert!(store.read_all("sensor.b").await.unwrap().is_empty());
}

#[tokio::test]
async fn reading_a_missing_table_is_a_store_error() {
    let store = SqliteStore::in_memory().await.unwrap();
    let err = store.read_all("sensor.never").await.unwrap_err();
    assert!(matches!(err, predai_core::PredaiError::Store { .. }), "{err:?}");
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("predai.db");

    let store = SqliteStore::connect(&path).await.unwrap();
    store.ensure_table("sensor.load").await.unwrap();
    store
        .append_new("sensor.load", &[at(0, 1.0), at(30, 2.0)], Vec::new())
        .await
        .unwrap();
    store.close().await;

    let reopened = SqliteStore::connect(&path).await.unwrap();
    reopened.ensure_table("sensor.load").await.unwrap();
    assert_eq!(
        reopened.read_all("sensor.load").await.unwrap(),
        vec![at(0, 1.0), at(30, 2.0)]
    );
}
