//! Demonstration endpoints.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use cerebral_core::error::{CerebralError, Result};

use crate::app_state::AppState;

pub const TEST_ERROR_MSG: &str = "This is a test error";

/// `GET /`
///
/// Also times itself into `request_processing_seconds`, on top of what the
/// middleware records.
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let _timer = state.metrics().request_time.start_timer();
    tracing::info!("processing request for root endpoint");
    Json(json!({ "Hello": "World" }))
}

fn raise_test_error() -> Result<Value> {
    Err(CerebralError::Demo(TEST_ERROR_MSG.into()))
}

/// `GET /error`
///
/// The error never reaches the transport: it is counted, logged and echoed
/// back with status 200.
pub async fn trigger_error(State(state): State<AppState>) -> Json<Value> {
    let body = match raise_test_error() {
        Ok(v) => v,
        Err(e) => {
            state.metrics().error_count.inc();
            tracing::error!(code = e.client_code().as_str(), "an error occurred: {e}");
            json!({ "error": e.to_string() })
        }
    };
    Json(body)
}
