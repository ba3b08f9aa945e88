//! `tfh poll`: re-run an inspection command until a marker appears.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::application::ports::CommandRunner;
use crate::application::services::poll::poll_until;
use crate::domain::policy::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollPolicy};
use crate::output::{OutputContext, json, progress};

/// Arguments for the poll command.
#[derive(Args, Debug)]
pub struct PollArgs {
    /// Text whose presence in the output means success
    #[arg(long = "success", value_name = "TEXT")]
    pub success_marker: String,

    /// Text whose presence in the output means failure
    #[arg(long = "failure", value_name = "TEXT")]
    pub failure_marker: String,

    /// Maximum number of inspections
    #[arg(long, default_value_t = DEFAULT_POLL_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds between inspections
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub interval: u64,

    /// Seconds to wait before the first inspection
    #[arg(long, default_value_t = 0)]
    pub initial_delay: u64,

    /// Inspection command, after `--`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Serialize)]
struct PollOutput<'a> {
    status: &'static str,
    inspections: u32,
    output: &'a str,
}

/// Run `tfh poll`.
///
/// # Errors
///
/// Returns an error if the policy is invalid, the failure marker shows up,
/// or the inspection budget runs out.
pub async fn run(
    ctx: &OutputContext,
    args: PollArgs,
    json_out: bool,
    runner: &impl CommandRunner,
) -> Result<()> {
    let command = super::command_from_words(&args.command)?;
    let policy = PollPolicy::new(
        args.attempts,
        Duration::from_secs(args.interval),
        args.success_marker,
        args.failure_marker,
    )?
    .with_initial_delay(Duration::from_secs(args.initial_delay));

    let pb = if json_out {
        progress::hidden()
    } else {
        ctx.spinner(&format!("waiting for '{}'", policy.success_marker()))
    };

    match poll_until(runner, &command, &policy).await {
        Ok(report) => {
            progress::finish_success(
                &pb,
                &format!("'{}' observed", policy.success_marker()),
            );
            if json_out {
                let out = PollOutput {
                    status: "succeeded",
                    inspections: report.inspections,
                    output: &report.output,
                };
                println!("{}", json::format_value(&out)?);
            } else {
                ctx.success(&format!(
                    "'{}' observed after {} inspection(s)",
                    policy.success_marker(),
                    report.inspections
                ));
            }
            Ok(())
        }
        Err(e) => {
            progress::finish_error(&pb, "polling failed");
            Err(e.into())
        }
    }
}
