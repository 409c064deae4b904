//! Where the board gets its latest reading from.

use std::time::Duration;

use async_trait::async_trait;

use greenhouse_core::error::{GreenhouseError, Result};
use greenhouse_core::SensorReading;

use crate::config::BoardSection;

#[async_trait]
pub trait LatestSource: Send + Sync {
    /// `Ok(None)` when the backend has no readings yet.
    async fn fetch_latest(&self) -> Result<Option<SensorReading>>;
}

/// Polls `GET {base_url}/sensor/latest` on the gateway.
pub struct HttpLatestSource {
    client: reqwest::Client,
    url: String,
}

impl HttpLatestSource {
    pub fn new(cfg: &BoardSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| GreenhouseError::Internal(format!("http client build failed: {e}")))?;
        let url = format!("{}/sensor/latest", cfg.base_url.trim_end_matches('/'));
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LatestSource for HttpLatestSource {
    async fn fetch_latest(&self) -> Result<Option<SensorReading>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GreenhouseError::StorageUnavailable(format!("backend unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GreenhouseError::Internal(format!("backend returned {status}")));
        }
        resp.json::<Option<SensorReading>>()
            .await
            .map_err(|e| GreenhouseError::Internal(format!("invalid latest payload: {e}")))
    }
}
