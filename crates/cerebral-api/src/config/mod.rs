//! API config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use cerebral_core::error::{CerebralError, Result};

pub use schema::{ApiConfig, ApiSection, ExporterSection, MetricsSection};

/// Default config file, looked up in the working directory.
pub const DEFAULT_PATH: &str = "cerebral.yaml";

pub fn load_from_file(path: &str) -> Result<ApiConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| CerebralError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ApiConfig> {
    let cfg: ApiConfig = serde_yaml::from_str(s)
        .map_err(|e| CerebralError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when it exists, otherwise fall back to built-in defaults.
pub fn load_or_default(path: &str) -> Result<ApiConfig> {
    if Path::new(path).exists() {
        tracing::info!(%path, "loading config");
        load_from_file(path)
    } else {
        tracing::info!(%path, "config file not found, using defaults");
        let cfg = ApiConfig::default();
        cfg.validate()?;
        Ok(cfg)
    }
}
