use std::path::PathBuf;

use serde::Deserialize;
use greenhouse_core::error::{GreenhouseError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub board: BoardSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GreenhouseError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.storage.validate()?;
        self.board.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen
            .parse::<std::net::SocketAddr>()
            .map(|_| ())
            .map_err(|e| GreenhouseError::BadRequest(format!("server.listen invalid: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Process-local, lost on restart.
    Memory,
}

/// Maps 1:1 to the SQLite `synchronous` pragma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Normal,
    Full,
}

impl SyncMode {
    pub const fn pragma_value(self) -> &'static str {
        match self {
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Idle connections kept open for reuse.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    #[serde(default)]
    pub synchronous: SyncMode,

    #[serde(default = "default_history_max_limit")]
    pub history_max_limit: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_size: default_pool_size(),
            synchronous: SyncMode::default(),
            history_max_limit: default_history_max_limit(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::Sqlite {
            let p = self.path.as_os_str();
            if p.is_empty() {
                return Err(GreenhouseError::BadRequest("storage.path must not be empty".into()));
            }
            // each pooled connection would get its own private database
            if p == ":memory:" {
                return Err(GreenhouseError::BadRequest(
                    "storage.path \":memory:\" is not shared across connections; use backend: memory".into(),
                ));
            }
        }
        if !(100..=60000).contains(&self.busy_timeout_ms) {
            return Err(GreenhouseError::BadRequest(
                "storage.busy_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if !(1..=64).contains(&self.pool_size) {
            return Err(GreenhouseError::BadRequest(
                "storage.pool_size must be between 1 and 64".into(),
            ));
        }
        if !(1..=10000).contains(&self.history_max_limit) {
            return Err(GreenhouseError::BadRequest(
                "storage.history_max_limit must be between 1 and 10000".into(),
            ));
        }
        Ok(())
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("greenhouse.db")
}
fn default_busy_timeout_ms() -> u64 {
    5000
}
fn default_pool_size() -> usize {
    8
}
fn default_history_max_limit() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// `None` polls until stopped.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: Option<u64>,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_ms: default_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl BoardSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GreenhouseError::BadRequest(
                "board.base_url must start with http:// or https://".into(),
            ));
        }
        if !(100..=3_600_000).contains(&self.interval_ms) {
            return Err(GreenhouseError::BadRequest(
                "board.interval_ms must be between 100 and 3600000".into(),
            ));
        }
        if !(100..=60000).contains(&self.request_timeout_ms) {
            return Err(GreenhouseError::BadRequest(
                "board.request_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(GreenhouseError::BadRequest(
                "board.max_iterations must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_interval_ms() -> u64 {
    2000
}
fn default_request_timeout_ms() -> u64 {
    2000
}
fn default_max_iterations() -> Option<u64> {
    Some(1000)
}
