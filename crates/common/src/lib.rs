//! Shortsmith Common Utilities
//!
//! Shared infrastructure for all Shortsmith crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Environment configuration (asset locations, detector model)

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
