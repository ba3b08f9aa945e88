//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::infra::TokioCommandRunner;
use crate::output::OutputContext;

/// Retry, poll and teardown harness for Terraform and gcloud tests
#[derive(Parser)]
#[command(
    name = "tfh",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a command, retrying on failure
    Retry(commands::retry::RetryArgs),

    /// Re-run an inspection command until a marker appears
    Poll(commands::poll::PollArgs),

    /// Check tools and environment
    Doctor,

    /// Show harness environment variables
    Env,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        let ctx = OutputContext::new(no_color, quiet);
        let runner = TokioCommandRunner::default();
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
            Command::Retry(args) => commands::retry::run(&ctx, args, json, &runner).await,
            Command::Poll(args) => commands::poll::run(&ctx, args, json, &runner).await,
            Command::Doctor => {
                let env = crate::infra::env::read_env()?;
                commands::doctor::run(&ctx, json, &runner, &env).await
            }
            Command::Env => {
                let env = crate::infra::env::read_env()?;
                commands::env::run(&ctx, json, env)
            }
        }
    }
}
