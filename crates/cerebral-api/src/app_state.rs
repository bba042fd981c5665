//! Shared application state for the cerebral API.
//!
//! The metrics registry is built here and handed to the middleware and the
//! handlers through axum state; nothing is process-global.

use std::sync::Arc;

use cerebral_core::error::Result;

use crate::config::ApiConfig;
use crate::obs::{ApiMetrics, Registry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ApiConfig,
    registry: Arc<Registry>,
    metrics: ApiMetrics,
}

impl AppState {
    /// Build state with a fresh registry.
    pub fn new(cfg: ApiConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build state on top of a caller-owned registry. Fails if the API
    /// metric names are already taken in it.
    pub fn with_registry(cfg: ApiConfig, registry: Arc<Registry>) -> Result<Self> {
        let metrics = ApiMetrics::register(&registry, &cfg.metrics.latency_buckets)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, metrics }),
        })
    }

    pub fn cfg(&self) -> &ApiConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ApiMetrics {
        &self.inner.metrics
    }

    /// Current exposition text.
    pub fn render_metrics(&self) -> String {
        self.inner.registry.render()
    }
}
