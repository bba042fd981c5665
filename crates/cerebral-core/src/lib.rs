//! cerebral core: error surface shared by the API crate and its tests.
//!
//! This crate carries no runtime or transport dependencies so the error
//! taxonomy can be reused by any binary that embeds the metrics registry.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;

pub use error::{CerebralError, ClientCode, Result};
