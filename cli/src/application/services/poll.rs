//! Poll an inspection command until a success or failure marker shows up.
//!
//! Typical use: wait for a VM startup script to print its verdict to the
//! serial console, or for a managed service to report it is serving.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::CommandRunner;
use crate::domain::command::Command;
use crate::domain::error::HarnessError;
use crate::domain::policy::{PollPolicy, PollState};

/// How a successful poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Inspections performed, including the one that matched.
    pub inspections: u32,
    /// Output of the matching inspection.
    pub output: String,
}

/// Run `command` up to `policy.max_attempts()` times.
///
/// A failed inspection (transient API error, VM not ready) is logged and
/// counted as "no marker observed"; only the failure marker text ends the
/// loop early with an error.
///
/// # Errors
///
/// - [`HarnessError::PollFailed`] when the failure marker appears.
/// - [`HarnessError::PollTimedOut`] when the budget is spent without seeing
///   either marker.
pub async fn poll_until(
    runner: &impl CommandRunner,
    command: &Command,
    policy: &PollPolicy,
) -> Result<PollReport, HarnessError> {
    let max = policy.max_attempts();
    if !policy.initial_delay().is_zero() {
        tokio::time::sleep(policy.initial_delay()).await;
    }

    for inspection in 1..=max {
        let result = runner.run(command).await;
        let state = match &result.error {
            Some(err) => {
                tracing::warn!(inspection, max_attempts = max, error = %err, "inspection failed, will retry");
                PollState::Polling
            }
            None => policy.observe(&result.output),
        };

        match state {
            PollState::Succeeded => {
                tracing::info!(inspection, marker = policy.success_marker(), "success marker observed");
                return Ok(PollReport {
                    inspections: inspection,
                    output: result.output,
                });
            }
            PollState::Failed => {
                return Err(HarnessError::PollFailed {
                    command: command.to_string(),
                    marker: policy.failure_marker().to_string(),
                    inspection,
                    output: result.output,
                });
            }
            PollState::Polling | PollState::TimedOut => {
                tracing::debug!(inspection, max_attempts = max, "no marker yet");
            }
        }

        if inspection < max {
            tokio::time::sleep(policy.interval()).await;
        }
    }

    tracing::warn!(state = ?PollState::TimedOut, attempts = max, %command, "poll timed out");
    Err(HarnessError::PollTimedOut {
        command: command.to_string(),
        marker: policy.success_marker().to_string(),
        attempts: max,
    })
}
