//! Fixed-delay retry around a single command.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::CommandRunner;
use crate::domain::command::{Command, CommandError, CommandResult};
use crate::domain::error::HarnessError;
use crate::domain::outcome::{BenignPatterns, Outcome};
use crate::domain::policy::RetryPolicy;

/// Run `command` until it succeeds or `policy.max_attempts()` is used up.
///
/// Sleeps `policy.delay()` between attempts, never after the last one.
///
/// # Errors
///
/// Returns [`HarnessError::RetriesExhausted`] carrying the last error and
/// output when every attempt failed.
pub async fn run_with_retry(
    runner: &impl CommandRunner,
    command: &Command,
    policy: &RetryPolicy,
) -> Result<CommandResult, HarnessError> {
    let max = policy.max_attempts();
    let mut last = CommandResult::failure("", CommandError::Exit(-1));

    for attempt in 1..=max {
        tracing::info!(attempt, max_attempts = max, %command, "attempt");
        let result = runner.run(command).await;
        if result.is_success() {
            tracing::info!(attempt, max_attempts = max, "command succeeded");
            return Ok(result);
        }
        if let Some(err) = &result.error {
            tracing::warn!(attempt, max_attempts = max, error = %err, "attempt failed");
        }
        last = result;
        if attempt < max {
            tracing::info!(delay = ?policy.delay(), "sleeping before retry");
            tokio::time::sleep(policy.delay()).await;
        }
    }

    Err(HarnessError::RetriesExhausted {
        command: command.to_string(),
        attempts: max,
        last_error: last.error.unwrap_or(CommandError::Exit(-1)),
        last_output: last.output,
    })
}

/// Like [`run_with_retry`], but an attempt whose output matches `benign`
/// ends the loop as a [`Outcome::BenignFailure`] instead of being retried.
///
/// Used for idempotent creates ("already exists") and deletes ("not found").
/// The result of the attempt that decided the outcome is returned with it.
///
/// # Errors
///
/// Returns [`HarnessError::RetriesExhausted`] when every attempt failed with
/// output that matched none of the benign patterns.
pub async fn run_idempotent(
    runner: &impl CommandRunner,
    command: &Command,
    policy: &RetryPolicy,
    benign: &BenignPatterns,
) -> Result<(Outcome, CommandResult), HarnessError> {
    let max = policy.max_attempts();
    let mut last = CommandResult::failure("", CommandError::Exit(-1));

    for attempt in 1..=max {
        tracing::info!(attempt, max_attempts = max, %command, "attempt");
        let result = runner.run(command).await;
        match Outcome::classify(&result, benign) {
            Outcome::FatalFailure(detail) => {
                tracing::warn!(attempt, max_attempts = max, %detail, "attempt failed");
            }
            Outcome::BenignFailure(reason) => {
                tracing::info!(%command, %reason, "benign failure, treating as done");
                return Ok((Outcome::BenignFailure(reason), result));
            }
            Outcome::Success => return Ok((Outcome::Success, result)),
        }
        last = result;
        if attempt < max {
            tokio::time::sleep(policy.delay()).await;
        }
    }

    Err(HarnessError::RetriesExhausted {
        command: command.to_string(),
        attempts: max,
        last_error: last.error.unwrap_or(CommandError::Exit(-1)),
        last_output: last.output,
    })
}
