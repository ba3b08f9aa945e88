//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::command::CommandError;

// ── Harness errors ────────────────────────────────────────────────────────────

/// Terminal failures of the retry and polling loops. Each one aborts the
/// calling test.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("`{command}` failed after {attempts} attempts. Last error: {last_error}\n{last_output}")]
    RetriesExhausted {
        command: String,
        attempts: u32,
        last_error: CommandError,
        last_output: String,
    },

    #[error("failure marker '{marker}' observed on inspection {inspection} of `{command}`. Full output:\n{output}")]
    PollFailed {
        command: String,
        marker: String,
        inspection: u32,
        output: String,
    },

    #[error("timeout: success marker '{marker}' never observed after {attempts} inspections of `{command}`")]
    PollTimedOut {
        command: String,
        marker: String,
        attempts: u32,
    },
}

impl HarnessError {
    /// Stable machine-readable code for `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::PollFailed { .. } => "POLL_FAILED",
            Self::PollTimedOut { .. } => "POLL_TIMED_OUT",
        }
    }
}

// ── Policy errors ─────────────────────────────────────────────────────────────

/// Invalid retry or poll policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("{0} marker must not be empty")]
    EmptyMarker(&'static str),

    #[error("success and failure markers must differ (both are '{0}')")]
    IdenticalMarkers(String),
}

impl PolicyError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroAttempts => "ZERO_ATTEMPTS",
            Self::EmptyMarker(_) => "EMPTY_MARKER",
            Self::IdenticalMarkers(_) => "IDENTICAL_MARKERS",
        }
    }
}

// ── Context errors ────────────────────────────────────────────────────────────

/// Precondition failures detected before any cloud mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error(
        "Environment variable TF_VAR_project_id is not set. \
         Please set it to your GCP project ID to run integration tests."
    )]
    MissingProjectId,

    #[error("Invalid zone format: {0}. Expected format like 'us-central1-a'")]
    InvalidZone(String),

    #[error("extracted project number '{value}' is not a valid number. Full output: {output}")]
    InvalidProjectNumber { value: String, output: String },

    #[error("no value at path '{0}' in JSON output")]
    MissingJsonPath(String),
}

impl ContextError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingProjectId => "MISSING_PROJECT_ID",
            Self::InvalidZone(_) => "INVALID_ZONE",
            Self::InvalidProjectNumber { .. } => "INVALID_PROJECT_NUMBER",
            Self::MissingJsonPath(_) => "MISSING_JSON_PATH",
        }
    }
}
