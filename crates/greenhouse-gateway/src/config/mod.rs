//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use greenhouse_core::error::{GreenhouseError, Result};

pub use schema::{BoardSection, GatewayConfig, ServerSection, StorageBackend, StorageSection, SyncMode};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "GREENHOUSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "greenhouse.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GreenhouseError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| GreenhouseError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Path from `GREENHOUSE_CONFIG`, else `greenhouse.yaml`.
pub fn config_path_from_env() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
