//! JSON output helpers.
//!
//! Every `--json` code path prints one pretty-printed object on stdout;
//! `main` reports failures with [`format_error`].

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::error::{ContextError, HarnessError, PolicyError};

/// Machine-readable code for an error returned by a command. Typed harness
/// errors keep their own code; anything else is `ERROR`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<HarnessError>() {
        e.code()
    } else if let Some(e) = err.downcast_ref::<PolicyError>() {
        e.code()
    } else if let Some(e) = err.downcast_ref::<ContextError>() {
        e.code()
    } else {
        "ERROR"
    }
}

/// Format a JSON error object:
/// `{"error": true, "message": "...", "code": "..."}`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Pretty-print any serializable value.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_value<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}
