//! Latest-reading and history queries, run against both backends.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use greenhouse_core::NewReading;
use greenhouse_gateway::config::StorageSection;
use greenhouse_gateway::store::{MemoryStore, ReadingStore, SqliteStore};

fn at(ms: u64, temperature: f64) -> NewReading {
    NewReading {
        sensor_id: Some("dht22".into()),
        temperature: Some(temperature),
        humidity: Some(55.0),
        recorded_at_ms: Some(ms),
        ..Default::default()
    }
}

async fn empty_store_has_no_latest(store: &dyn ReadingStore) {
    assert_eq!(store.history(usize::MAX).await.unwrap().len(), before_rows);
    assert!(store.history(10).await.unwrap().is_empty());
}

async fn latest_follows_time_not_insert_order(store: &dyn ReadingStore) {
    store.insert(at(2_000, 21.0)).await.unwrap();
    store.insert(at(3_000, 23.0)).await.unwrap();
    // late delivery of an older sample
    store.insert(at(1_000, 19.0)).await.unwrap();

    let latest = store.latest().await.unwrap().expect("has rows");
    assert_eq!(latest.recorded_at_ms, 3_000);
    assert_eq!(latest.temperature, Some(23.0));

    // equal timestamps: the later insert wins
    let tie = store.insert(at(3_000, 24.0)).await.unwrap();
    let latest = store.latest().await.unwrap().unwrap();
    assert_eq!(latest.id, tie.id);
    assert_eq!(latest.temperature, Some(24.0));
}

async fn history_is_newest_first_and_bounded(store: &dyn ReadingStore) {
    for i in 0..10u64 {
        store.insert(at(10_000 + i * 100, 20.0 + i as f64)).await.unwrap();
    }
    let rows = store.history(4).await.unwrap();
    let times: Vec<u64> = rows.iter().map(|r| r.recorded_at_ms).collect();
    assert_eq!(times, vec![10_900, 10_800, 10_700, 10_600]);
}

async fn insert_validates_and_stamps(store: &dyn ReadingStore) {
    let before_rows = store.history(usize::MAX).await.unwrap().len();
    let err = store.insert(NewReading::default()).await.expect_err("no metrics");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

    let err = store
        .insert(NewReading { temperature: Some(20.0), recorded_at_ms: Some(u64::MAX), ..Default::default() })
        .await
        .expect_err("timestamp out of range");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    assert_eq!(store.history(usize::MAX).await.unwrap().len(), before_rows);

    let before = greenhouse_core::clock::now_millis();
    let stored = store
        .insert(NewReading { water_level: Some(80.0), ..Default::default() })
        .await
        .unwrap();
    assert!(stored.recorded_at_ms >= before);
    assert_eq!(stored.sensor_id, "default");
    assert_eq!(stored.water_level, Some(80.0));
    assert_eq!(stored.temperature, None);
}

#[tokio::test]
async fn sqlite_readings() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StorageSection { path: dir.path().join("readings.db"), ..StorageSection::default() };
    let store = SqliteStore::open(&cfg).unwrap();
    empty_store_has_no_latest(&store).await;
    latest_follows_time_not_insert_order(&store).await;
}

#[tokio::test]
async fn sqlite_history_and_validation() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StorageSection { path: dir.path().join("readings.db"), ..StorageSection::default() };
    let store = SqliteStore::open(&cfg).unwrap();
    history_is_newest_first_and_bounded(&store).await;
    insert_validates_and_stamps(&store).await;
}

#[tokio::test]
async fn sqlite_latest_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StorageSection { path: dir.path().join("readings.db"), ..StorageSection::default() };
    let stored = {
        let store = SqliteStore::open(&cfg).unwrap();
        store.insert(at(5_000, 26.5)).await.unwrap()
    };
    let store = SqliteStore::open(&cfg).unwrap();
    assert_eq!(store.latest().await.unwrap(), Some(stored));
}

#[tokio::test]
async fn memory_readings() {
    empty_store_has_no_latest(&MemoryStore::new()).await;
    latest_follows_time_not_insert_order(&MemoryStore::new()).await;
    history_is_newest_first_and_bounded(&MemoryStore::new()).await;
    insert_validates_and_stamps(&MemoryStore::new()).await;
}
