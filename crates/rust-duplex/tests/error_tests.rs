//! Error handling tests.
//!
//! Tests for the error types, error creation helpers, and error introspection.

use std::io;

use rust_duplex::{DuplexError, Field};

#[test]
fn queue_full_introspection() {
    let err = DuplexError::queue_full(10);
    assert!(err.is_queue_full());
    assert!(!err.is_oversized());
    assert!(!err.is_io());
}

#[test]
fn oversized_names_field() {
    let err = DuplexError::oversized(Field::Expectation, "A".repeat(130), 128);
    assert!(err.is_oversized());
    assert!(err.to_string().starts_with("expectation is 130 bytes, maximum is 128"));
}

#[test]
fn invalid_pattern_display() {
    let err = DuplexError::invalid_pattern("(OK", "unclosed group");
    assert_eq!(err.to_string(), "invalid pattern '(OK': unclosed group");
}

#[test]
fn hook_registry_full_display() {
    let err = DuplexError::hook_registry_full(8);
    assert_eq!(err.to_string(), "hook registry is full (capacity 8)");
}

#[test]
fn io_conversion() {
    let err: DuplexError = io::Error::new(io::ErrorKind::TimedOut, "no reply").into();
    assert!(err.is_io());
    assert!(err.to_string().contains("no reply"));
}

#[test]
fn io_context_keeps_source() {
    use std::error::Error as _;

    let err = DuplexError::io_context(
        "reading input",
        io::Error::new(io::ErrorKind::BrokenPipe, "port closed"),
    );
    assert_eq!(err.to_string(), "reading input: port closed");
    assert!(err.source().is_some());
}

#[test]
fn config_error_display() {
    let err = DuplexError::config("queue_capacity must be greater than 0");
    assert!(err.to_string().starts_with("configuration error"));
}
