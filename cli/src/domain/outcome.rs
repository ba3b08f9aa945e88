//! Classification of command results into success, benign failure and fatal
//! failure.
//!
//! gcloud and Terraform expose no structured error codes, so the only signal
//! is the human-readable output. The matching happens here, once, against a
//! caller-supplied pattern set.

use crate::domain::command::CommandResult;

/// Substrings gcloud prints when a resource is already gone.
pub const NOT_FOUND_PATTERNS: &[&str] = &[
    "already deleted",
    "was not found",
    "does not exist",
    "NotFoundException",
    "matched no objects",
    "not found",
];

/// Substrings gcloud prints when a create targets an existing resource.
pub const ALREADY_EXISTS_PATTERNS: &[&str] = &["already exists", "ALREADY_EXISTS"];

/// Ordered set of substrings that downgrade a failure to a benign one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenignPatterns(Vec<String>);

impl BenignPatterns {
    /// Empty set: every failure is fatal.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(patterns.into_iter().map(Into::into).collect())
    }

    /// Patterns for idempotent deletes.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_PATTERNS.iter().copied())
    }

    /// Patterns for idempotent creates.
    #[must_use]
    pub fn already_exists() -> Self {
        Self::new(ALREADY_EXISTS_PATTERNS.iter().copied())
    }

    /// Combine two sets, keeping order and dropping duplicates.
    #[must_use]
    pub fn union(mut self, other: &Self) -> Self {
        for p in &other.0 {
            if !self.0.contains(p) {
                self.0.push(p.clone());
            }
        }
        self
    }

    /// First pattern found in `output`, if any.
    #[must_use]
    pub fn find(&self, output: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| output.contains(p.as_str()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed view of one command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Failed, but the output matched a benign pattern (the pattern is the reason).
    BenignFailure(String),
    /// Failed for any other reason; carries the error and output.
    FatalFailure(String),
}

impl Outcome {
    #[must_use]
    pub fn classify(result: &CommandResult, benign: &BenignPatterns) -> Self {
        let Some(err) = &result.error else {
            return Self::Success;
        };
        if let Some(pattern) = benign.find(&result.output) {
            return Self::BenignFailure(pattern.to_string());
        }
        let output = result.output.trim();
        if output.is_empty() {
            Self::FatalFailure(err.to_string())
        } else {
            Self::FatalFailure(format!("{err}: {output}"))
        }
    }

    /// `Success` and `BenignFailure` both count as "done".
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::FatalFailure(_))
    }
}
