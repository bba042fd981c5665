//! Request instrumentation.
//!
//! Every application request bumps `in_progress_requests` on entry. On exit the
//! gauge goes back down, `request_count` is incremented and the elapsed time
//! lands in `request_latency_seconds`. Exit bookkeeping lives in a drop guard
//! so it also runs when the handler panics or the request future is dropped.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::metrics::{ApiMetrics, Observe};

/// One request in flight. Dropping it records the request.
pub struct InFlight<'a> {
    metrics: &'a ApiMetrics,
    start: Instant,
}

impl<'a> InFlight<'a> {
    pub fn enter(metrics: &'a ApiMetrics) -> Self {
        metrics.in_progress.inc();
        Self { metrics, start: Instant::now() }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics.in_progress.dec();
        self.metrics.request_count.inc();
        self.metrics.request_latency.observe_duration(self.start.elapsed());
    }
}

/// `axum::middleware::from_fn_with_state` entry. Never touches the response.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let _in_flight = InFlight::enter(state.metrics());
    next.run(req).await
}
