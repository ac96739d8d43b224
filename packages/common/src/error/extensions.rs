//! Extension traits for attaching context to `Result` and `Option`

use super::types::{Error, ErrorKind};
use std::fmt;

/// Attach context to any fallible result whose error converts into [`Error`]
pub trait ResultExt<T> {
    /// Wrap the error with a context message
    ///
    /// # Errors
    ///
    /// Returns the original error, converted and annotated, when `self` is `Err`.
    fn context<C: fmt::Display>(self, context: C) -> Result<T, Error>;

    /// Wrap the error with a lazily built context message
    ///
    /// # Errors
    ///
    /// Returns the original error, converted and annotated, when `self` is `Err`.
    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn context<C: fmt::Display>(self, context: C) -> Result<T, Error> {
        self.map_err(|e| Into::<Error>::into(e).context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Into::<Error>::into(e).context(f()))
    }
}

/// Turn a missing value into an [`Error`]
pub trait OptionExt<T> {
    /// Convert `None` into an error of the given kind with a context message
    ///
    /// # Errors
    ///
    /// Returns an error when `self` is `None`.
    fn context_none<C: fmt::Display>(self, kind: ErrorKind, context: C) -> Result<T, Error>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context_none<C: fmt::Display>(self, kind: ErrorKind, context: C) -> Result<T, Error> {
        self.ok_or_else(|| Error::new(kind).context(context))
    }
}
