//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format (also the exporter's fallback)
//! - fallback   : 404 for unknown API paths

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.render_metrics();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
