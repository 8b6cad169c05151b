//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use parley_core::error::{ParleyError, Result};

pub use schema::{GatewayConfig, GatewaySection, RelaySection};

/// Env var naming the config file; defaults to `parley.yaml`.
pub const CONFIG_ENV: &str = "PARLEY_CONFIG";

pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "parley.yaml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ParleyError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig =
        serde_yaml::from_str(s).map_err(|e| ParleyError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
