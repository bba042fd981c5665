//! Top-level facade crate for cerebral.
//!
//! Re-exports the error types and the API library so users can depend on a single crate.

pub mod core {
    pub use cerebral_core::*;
}

pub mod api {
    pub use cerebral_api::*;
}
