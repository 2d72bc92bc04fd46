//! gazetrack Common Utilities
//!
//! Shared infrastructure for all gazetrack crates:
//! - Error types and result aliases
//! - Clock abstraction and session epochs
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
