//! Core error types and definitions

use std::sync::Arc;
use thiserror::Error;

/// Application error with context propagation support
#[derive(Debug, Clone)]
pub struct Error {
    pub(super) inner: Arc<ErrorInner>,
}

#[derive(Debug)]
pub(super) struct ErrorInner {
    pub kind: ErrorKind,
    pub context: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    #[cfg(feature = "full-backtrace")]
    pub backtrace: backtrace::Backtrace,
}

/// Failure categories the driver and callers can branch on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// I/O related errors
    #[error("I/O error")]
    Io,

    /// Randomness, key generation or signing failures
    #[error("Cryptographic error")]
    Crypto,

    /// PEM, DER or X.509 encoding and decoding failures
    #[error("Encoding error")]
    Encoding,

    /// Certificate or signature validation failures
    #[error("Validation error")]
    Validation,

    /// Configuration errors
    #[error("Configuration error")]
    Configuration,
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
