//! `tfh retry`: run a command with a fixed-delay retry budget.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::application::ports::CommandRunner;
use crate::application::services::retry::{run_idempotent, run_with_retry};
use crate::domain::outcome::{BenignPatterns, Outcome};
use crate::domain::policy::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};
use crate::output::{OutputContext, json};

/// Arguments for the retry command.
#[derive(Args, Debug)]
pub struct RetryArgs {
    /// Maximum number of attempts
    #[arg(long, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs())]
    pub delay: u64,

    /// Output substring that ends the loop as a benign failure (repeatable)
    #[arg(long = "benign", value_name = "TEXT")]
    pub benign: Vec<String>,

    /// Command to run, after `--`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Serialize)]
struct RetryOutput<'a> {
    status: &'static str,
    reason: Option<&'a str>,
    output: &'a str,
}

/// Run `tfh retry`.
///
/// # Errors
///
/// Returns an error if the policy is invalid or every attempt failed.
pub async fn run(
    ctx: &OutputContext,
    args: RetryArgs,
    json_out: bool,
    runner: &impl CommandRunner,
) -> Result<()> {
    let command = super::command_from_words(&args.command)?;
    let policy = RetryPolicy::new(args.attempts, Duration::from_secs(args.delay))?;

    if args.benign.is_empty() {
        let result = run_with_retry(runner, &command, &policy).await?;
        if json_out {
            let out = RetryOutput {
                status: "success",
                reason: None,
                output: &result.output,
            };
            println!("{}", json::format_value(&out)?);
        } else {
            print!("{}", result.output);
            ctx.success(&format!("`{command}` succeeded"));
        }
        return Ok(());
    }

    let benign = BenignPatterns::new(args.benign);
    let (outcome, result) = run_idempotent(runner, &command, &policy, &benign).await?;
    let reason = match &outcome {
        Outcome::BenignFailure(reason) => Some(reason.as_str()),
        _ => None,
    };
    if json_out {
        let out = RetryOutput {
            status: if reason.is_some() { "benign" } else { "success" },
            reason,
            output: &result.output,
        };
        println!("{}", json::format_value(&out)?);
    } else {
        print!("{}", result.output);
        match reason {
            Some(reason) => ctx.warn(&format!("`{command}` failed benignly ({reason})")),
            None => ctx.success(&format!("`{command}` succeeded")),
        }
    }
    Ok(())
}
