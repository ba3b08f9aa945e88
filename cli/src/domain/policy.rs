//! Retry and poll policies.
//!
//! Pure values; validated at construction so the loops never see a policy
//! with zero attempts or ambiguous markers.

use std::time::Duration;

use crate::domain::error::PolicyError;

// ── Defaults ─────────────────────────────────────────────────────────────────

/// Attempts used for gcloud mutations that hit eventual consistency.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Delay between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);
/// Inspections while waiting for a VM startup script (24 x 10s = 4 minutes).
pub const DEFAULT_POLL_ATTEMPTS: u32 = 24;
/// Delay between inspections.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Wait after creating an App Engine application before using it.
pub const APP_ENGINE_SETTLE: Duration = Duration::from_secs(15);

// ── RetryPolicy ──────────────────────────────────────────────────────────────

/// Fixed attempt count with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// # Errors
    ///
    /// Returns [`PolicyError::ZeroAttempts`] if `max_attempts` is 0.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// Run once, never retry.
    #[must_use]
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

// ── PollPolicy ───────────────────────────────────────────────────────────────

/// Bounded polling with a success marker and a failure marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    max_attempts: u32,
    interval: Duration,
    initial_delay: Duration,
    success_marker: String,
    failure_marker: String,
}

impl PollPolicy {
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if `max_attempts` is 0, either marker is
    /// empty, or both markers are the same string.
    pub fn new(
        max_attempts: u32,
        interval: Duration,
        success_marker: impl Into<String>,
        failure_marker: impl Into<String>,
    ) -> Result<Self, PolicyError> {
        let success_marker = success_marker.into();
        let failure_marker = failure_marker.into();
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if success_marker.is_empty() {
            return Err(PolicyError::EmptyMarker("success"));
        }
        if failure_marker.is_empty() {
            return Err(PolicyError::EmptyMarker("failure"));
        }
        if success_marker == failure_marker {
            return Err(PolicyError::IdenticalMarkers(success_marker));
        }
        Ok(Self {
            max_attempts,
            interval,
            initial_delay: Duration::ZERO,
            success_marker,
            failure_marker,
        })
    }

    /// Wait before the first inspection (a freshly created VM has no serial
    /// output yet).
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    #[must_use]
    pub fn success_marker(&self) -> &str {
        &self.success_marker
    }

    #[must_use]
    pub fn failure_marker(&self) -> &str {
        &self.failure_marker
    }

    /// Classify one inspection's output. The success marker wins when both
    /// markers are present.
    #[must_use]
    pub fn observe(&self, output: &str) -> PollState {
        if output.contains(&self.success_marker) {
            PollState::Succeeded
        } else if output.contains(&self.failure_marker) {
            PollState::Failed
        } else {
            PollState::Polling
        }
    }
}

/// States of a polling loop. `Polling` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl PollState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Polling)
    }
}
