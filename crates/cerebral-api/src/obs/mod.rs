//! In-process metrics and the request instrumentation middleware.
//!
//! Metrics are stored as atomics, indexed by an explicitly constructed
//! [`metrics::Registry`] carried in `AppState`, and rendered by the `/metrics`
//! handler and the exporter listener.

pub mod metrics;
pub mod middleware;

pub use metrics::{ApiMetrics, Counter, Gauge, Histogram, Instrument, MetricKind, Registry, Summary};
pub use middleware::{track_requests, InFlight};
