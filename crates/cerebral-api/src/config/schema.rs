use std::net::SocketAddr;

use serde::Deserialize;

use cerebral_core::error::{CerebralError, Result};

use crate::obs::metrics::{validate_buckets, DEFAULT_BUCKETS};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub version: u32,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api: ApiSection::default(),
            exporter: ExporterSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CerebralError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        let api = self.api.listen_addr()?;
        if self.exporter.enabled && self.exporter.listen_addr()? == api {
            return Err(CerebralError::BadRequest(
                "exporter.listen must differ from api.listen".into(),
            ));
        }

        validate_buckets(&self.metrics.latency_buckets).map_err(|e| match e {
            CerebralError::BadRequest(msg) => {
                CerebralError::BadRequest(format!("metrics.latency_buckets: {msg}"))
            }
            other => other,
        })?;

        Ok(())
    }
}

fn parse_listen(field: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| CerebralError::BadRequest(format!("{field} must be a valid SocketAddr: {e}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_api_listen")]
    pub listen: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self { listen: default_api_listen() }
    }
}

impl ApiSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("api.listen", &self.listen)
    }
}

/// Dedicated scrape listener, independent of the API routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_exporter_listen")]
    pub listen: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: default_exporter_listen(),
        }
    }
}

impl ExporterSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("exporter.listen", &self.listen)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Upper bounds (seconds) of `request_latency_seconds`.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { latency_buckets: default_latency_buckets() }
    }
}

fn default_api_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_exporter_listen() -> String {
    "0.0.0.0:8001".into()
}
fn default_true() -> bool {
    true
}
fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
