//! Error handling with context propagation
//!
//! Provides an application-level error type with:
//! - A coarse [`ErrorKind`] for callers that branch on failure category
//! - Context strings attached while the error travels up
//! - Optional backtrace capture (`full-backtrace` feature)

pub mod constructors;
pub mod display;
pub mod extensions;
pub mod logging;
pub mod macros;
pub mod types;

pub use extensions::{OptionExt, ResultExt};
pub use logging::LoggingTransformer;
pub use types::{Error, ErrorKind, Result};
