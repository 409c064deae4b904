//! Shared application state for the greenhouse gateway.
//!
//! The store is opened (and its schema created) while building the state,
//! so no handler can run before storage is ready.

use std::sync::Arc;

use greenhouse_core::clock::now_millis;
use greenhouse_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::store::{self, Store};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    store: Arc<dyn Store>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    started_at_ms: u64,
}

impl AppState {
    /// Build application state, opening the configured store.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = store::open_store(&cfg.storage)?;
        Ok(Self::with_store(cfg, store))
    }

    /// Build state around an already opened store.
    pub fn with_store(cfg: GatewayConfig, store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, started_at_ms: now_millis() }),
            store,
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        tracing::info!("gateway draining");
        self.metrics.set_draining();
    }

    /// Epoch milliseconds when this state was built.
    pub fn started_at_ms(&self) -> u64 {
        self.inner.started_at_ms
    }
}
