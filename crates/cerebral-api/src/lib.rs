//! cerebral API library entry.
//!
//! Wires the metrics registry, the request instrumentation middleware and the
//! demonstration endpoints into an axum router. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
