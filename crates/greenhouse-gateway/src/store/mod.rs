//! Storage seam for counters and sensor readings.
//!
//! Handlers only see the traits below. `SqliteStore` is the durable backend;
//! `MemoryStore` keeps everything in-process for development and tests.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use greenhouse_core::error::Result;
use greenhouse_core::{CounterName, NewReading, SensorReading};

use crate::config::{StorageBackend, StorageSection};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Named monotonic counters.
///
/// # Invariants
/// - `increment_and_get` returns the value after this call's increment;
///   the first call for an unseen name returns 1.
/// - Concurrent calls on one name never observe the same pre-increment value.
/// - A failed call leaves no visible increment.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment_and_get(&self, name: &CounterName) -> Result<u64>;

    /// Current value without incrementing; `None` for a name never incremented.
    async fn current(&self, name: &CounterName) -> Result<Option<u64>>;
}

/// Persisted sensor readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Validate, stamp and persist a reading.
    async fn insert(&self, reading: NewReading) -> Result<SensorReading>;

    /// Most recent reading by `(recorded_at_ms, id)`, read from the store itself.
    async fn latest(&self) -> Result<Option<SensorReading>>;

    /// Newest-first, at most `limit` rows.
    async fn history(&self, limit: usize) -> Result<Vec<SensorReading>>;
}

/// Both stores behind one handle.
pub trait Store: CounterStore + ReadingStore {}

impl<T: CounterStore + ReadingStore> Store for T {}

/// Open the configured backend and make sure its schema exists.
///
/// Runs once at startup, before any handler can reach the store.
pub fn open_store(cfg: &StorageSection) -> Result<Arc<dyn Store>> {
    match cfg.backend {
        StorageBackend::Sqlite => {
            let store = SqliteStore::open(cfg)?;
            tracing::info!(path = %cfg.path.display(), pool_size = cfg.pool_size, "sqlite store ready");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("memory store selected; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
