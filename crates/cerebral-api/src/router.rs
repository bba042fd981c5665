//! Axum router wiring.
//!
//! The instrumentation middleware is a router-wide `layer`, so it also wraps
//! the 404/405 fallbacks. `/metrics` is added after the layer and stays
//! uncounted; two scrapes with no traffic in between render the same values.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, handlers, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/error", get(handlers::trigger_error))
        .fallback(ops::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::track_requests,
        ))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}

/// Second listener: every path serves the registry snapshot.
pub fn build_exporter_router(state: AppState) -> Router {
    Router::new().fallback(ops::metrics).with_state(state)
}
