//! Shared error type across cerebral crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed config or metric name.
    BadRequest,
    /// Metric name already taken in the registry.
    Conflict,
    /// Metric name not registered.
    NotFound,
    /// Operation not supported by the metric kind.
    WrongKind,
    /// Demonstration error raised by `/error`.
    Demo,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Conflict => "CONFLICT",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::WrongKind => "WRONG_KIND",
            ClientCode::Demo => "DEMO",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CerebralError>;

/// Unified error type used by core and the API crate.
#[derive(Debug, Error)]
pub enum CerebralError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("metric {name} is a {actual}, cannot {op}")]
    KindMismatch {
        name: String,
        actual: &'static str,
        op: &'static str,
    },
    #[error("config: {0}")]
    Config(String),
    /// Displays as the bare message; `/error` echoes it to the client.
    #[error("{0}")]
    Demo(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CerebralError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CerebralError::BadRequest(_) => ClientCode::BadRequest,
            CerebralError::AlreadyRegistered(_) => ClientCode::Conflict,
            CerebralError::UnknownMetric(_) => ClientCode::NotFound,
            CerebralError::KindMismatch { .. } => ClientCode::WrongKind,
            CerebralError::Config(_) => ClientCode::Internal,
            CerebralError::Demo(_) => ClientCode::Demo,
            CerebralError::Internal(_) => ClientCode::Internal,
        }
    }
}
