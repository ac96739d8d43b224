//! Tests for error kinds, context chaining and the helper macros

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lowsig_common::{Error, ErrorKind, OptionExt, Result, ResultExt};

fn failing_io() -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing ca.json"))
}

#[test]
fn io_errors_convert_with_io_kind_and_context() {
    let err = failing_io().context("loading CA config").unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Io);
    assert_eq!(err.get_context(), Some("loading CA config"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("I/O error: loading CA config"));
    assert!(rendered.contains("missing ca.json"));
}

#[test]
fn lazy_context_is_built_only_on_error() {
    let mut calls = 0;
    let ok: std::result::Result<u8, std::io::Error> = Ok(1);
    let value = ok
        .with_context(|| {
            calls += 1;
            "unused"
        })
        .unwrap();
    assert_eq!(value, 1);
    assert_eq!(calls, 0);

    let err = failing_io()
        .with_context(|| format!("loading {}", "ca.json"))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Io);
    assert_eq!(err.get_context(), Some("loading ca.json"));
}

#[test]
fn backtrace_is_captured_on_creation() {
    let err = Error::validation();
    assert!(!format!("{:?}", err.backtrace()).is_empty());
}

#[test]
fn context_on_bare_error_keeps_kind() {
    let err = Error::validation().context("chain rejected");

    assert_eq!(err.kind(), &ErrorKind::Validation);
    assert_eq!(err.to_string(), "Validation error: chain rejected");
    assert!(std::error::Error::source(&err).is_none());
}

#[test]
fn nested_context_preserves_previous_error_as_source() {
    let err = Error::new(ErrorKind::Crypto)
        .context("signing TBS certificate")
        .context("generating CA");

    assert_eq!(err.kind(), &ErrorKind::Crypto);
    assert_eq!(err.get_context(), Some("generating CA"));
    let source = std::error::Error::source(&err).expect("source kept");
    assert!(source.to_string().contains("signing TBS certificate"));
}

#[test]
fn option_ext_maps_none_to_error() {
    let missing: Option<u8> = None;
    let err = missing
        .context_none(ErrorKind::Configuration, "no subject")
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Configuration);

    assert_eq!(Some(7u8).context_none(ErrorKind::Validation, "unused").unwrap(), 7);
}

fn guarded(value: usize) -> Result<usize> {
    lowsig_common::ensure!(value > 0, validation, "value must be positive, got {}", value);
    Ok(value)
}

#[test]
fn ensure_macro_bails_with_location() {
    assert_eq!(guarded(3).unwrap(), 3);

    let err = guarded(0).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Validation);
    let context = err.get_context().unwrap();
    assert!(context.starts_with("value must be positive, got 0 at "));
    assert!(context.contains("error_context.rs"));
}
