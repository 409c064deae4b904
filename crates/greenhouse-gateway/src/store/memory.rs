//! In-process store.
//!
//! Counter upsert and increment happen while holding the DashMap shard lock
//! for that name, which plays the role of the row lock in the SQL backend.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use greenhouse_core::clock::now_millis;
use greenhouse_core::error::{GreenhouseError, Result};
use greenhouse_core::{CounterName, NewReading, SensorReading};

use super::{CounterStore, ReadingStore};

#[derive(Default)]
pub struct MemoryStore {
    counters: DashMap<CounterName, u64>,
    readings: RwLock<Vec<SensorReading>>,
    next_reading_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment_and_get(&self, name: &CounterName) -> Result<u64> {
        let mut value = self.counters.entry(name.clone()).or_insert(0);
        let next = value
            .checked_add(1)
            .ok_or_else(|| GreenhouseError::Internal(format!("counter {name} overflow")))?;
        *value = next;
        Ok(next)
    }

    async fn current(&self, name: &CounterName) -> Result<Option<u64>> {
        Ok(self.counters.get(name).map(|v| *v))
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert(&self, reading: NewReading) -> Result<SensorReading> {
        reading.validate()?;
        let id = self.next_reading_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = SensorReading::from_new(id, &reading, reading.recorded_at_or(now_millis()));
        self.readings.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn latest(&self) -> Result<Option<SensorReading>> {
        let rows = self.readings.read().await;
        Ok(rows.iter().max_by_key(|r| r.recency_key()).cloned())
    }

    async fn history(&self, limit: usize) -> Result<Vec<SensorReading>> {
        let mut rows = self.readings.read().await.clone();
        rows.sort_by_key(|r| std::cmp::Reverse(r.recency_key()));
        rows.truncate(limit);
        Ok(rows)
    }
}
