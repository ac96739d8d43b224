//! Common infrastructure shared by the lowsig crates
//!
//! This crate provides:
//! - Error handling with kind, context and source propagation
//! - `env_logger` based logging initialisation with redaction helpers

pub mod error;

pub use error::*;
