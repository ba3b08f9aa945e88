//! gcloud use-cases shared by tests: project lookups, describe-or-create,
//! waiting on a VM's serial console.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;
use crate::application::services::poll::{PollReport, poll_until};
use crate::domain::command::Command;
use crate::domain::error::HarnessError;
use crate::domain::gcloud::{parse_project_number, project_number_command, serial_port_command};
use crate::domain::policy::PollPolicy;

/// Look up the numeric project number for `project_id`.
///
/// # Errors
///
/// Returns an error if gcloud fails or prints something that is not a number.
pub async fn project_number(runner: &impl CommandRunner, project_id: &str) -> Result<String> {
    let result = runner.run(&project_number_command(project_id)).await;
    if let Some(err) = result.error {
        anyhow::bail!("error getting project number for {project_id}: {err}\n{}", result.output);
    }
    let number = parse_project_number(&result.output)?;
    tracing::info!(project_id, %number, "resolved project number");
    Ok(number)
}

/// Run `command` with `--format=json` and parse stdout.
///
/// # Errors
///
/// Returns an error if the command fails or its output is not JSON.
pub async fn describe_json(runner: &impl CommandRunner, command: &Command) -> Result<serde_json::Value> {
    let command = command.clone().arg("--format=json");
    let result = runner.run(&command).await;
    if let Some(err) = result.error {
        anyhow::bail!("`{command}` failed: {err}\n{}", result.output);
    }
    serde_json::from_str(result.output.trim())
        .with_context(|| format!("invalid JSON from `{command}`"))
}

/// What [`ensure_exists`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    AlreadyPresent,
    Created,
}

/// Describe a singleton resource and create it only when the describe output
/// contains `missing_marker` (App Engine applications cannot be deleted, so
/// tests share one per project).
///
/// After a create, waits `settle` so the new resource is usable; pass
/// [`Duration::ZERO`] to skip the wait. Nothing waits when the resource
/// was already present.
///
/// # Errors
///
/// Returns an error if the describe fails for any other reason, or if the
/// create fails.
pub async fn ensure_exists(
    runner: &impl CommandRunner,
    describe: &Command,
    create: &Command,
    missing_marker: &str,
    settle: Duration,
) -> Result<Ensured> {
    let described = runner.run(describe).await;
    if described.is_success() {
        tracing::info!(%describe, "resource already exists");
        return Ok(Ensured::AlreadyPresent);
    }
    if !described.contains(missing_marker) {
        anyhow::bail!(
            "`{describe}` failed for an unexpected reason:\n{}",
            described.output
        );
    }

    tracing::info!(%create, "resource missing, creating");
    let created = runner.run(create).await;
    if let Some(err) = created.error {
        anyhow::bail!("`{create}` failed: {err}\n{}", created.output);
    }
    if !settle.is_zero() {
        tracing::info!(?settle, "waiting for created resource to settle");
        tokio::time::sleep(settle).await;
    }
    Ok(Ensured::Created)
}

/// Poll serial port 1 of `vm_name` until the startup script prints one of
/// the policy's markers.
///
/// # Errors
///
/// See [`poll_until`].
pub async fn wait_for_serial_marker(
    runner: &impl CommandRunner,
    project_id: &str,
    vm_name: &str,
    zone: &str,
    policy: &PollPolicy,
) -> Result<PollReport, HarnessError> {
    tracing::info!(vm_name, zone, marker = policy.success_marker(), "waiting for startup script");
    poll_until(runner, &serial_port_command(project_id, vm_name, zone, 1), policy).await
}
