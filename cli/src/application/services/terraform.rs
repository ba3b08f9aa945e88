//! Terraform CLI driver: init, apply, plan, destroy, output.
//!
//! Terraform is a black box here; this only builds its command lines and
//! interprets exit codes and `-json` output.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;
use crate::domain::command::{Command, CommandResult};
use crate::domain::outcome::BenignPatterns;

/// Transient provider errors worth another `apply`.
pub const DEFAULT_RETRYABLE_ERRORS: &[&str] = &[
    "Error 409",
    "Error 429",
    "Error 503",
    "timeout while waiting for state",
    "connection reset by peer",
    "TLS handshake timeout",
    "Client.Timeout exceeded",
    "operation in progress",
];

/// Result of `terraform plan -detailed-exitcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Exit 0: infrastructure matches configuration.
    NoChanges,
    /// Exit 1: plan failed.
    Error,
    /// Exit 2: plan succeeded and has changes.
    Changes,
}

impl PlanStatus {
    #[must_use]
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::NoChanges,
            Some(2) => Self::Changes,
            _ => Self::Error,
        }
    }
}

/// Options for one Terraform working directory.
#[derive(Debug, Clone)]
pub struct TerraformOptions {
    pub dir: PathBuf,
    pub vars: BTreeMap<String, String>,
    pub reconfigure: bool,
    pub no_color: bool,
    pub retryable_errors: BenignPatterns,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl TerraformOptions {
    /// Defaults: `-no-color`, retry `apply` up to 3 times on the default
    /// retryable errors with 5s between attempts.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            vars: BTreeMap::new(),
            reconfigure: false,
            no_color: true,
            retryable_errors: BenignPatterns::new(DEFAULT_RETRYABLE_ERRORS.iter().copied()),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }

    /// Set `-var key=value`.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Point the module at a directory of YAML instance configs.
    #[must_use]
    pub fn config_folder(self, path: impl Into<String>) -> Self {
        self.var("config_folder_path", path)
    }

    #[must_use]
    pub fn reconfigure(mut self, reconfigure: bool) -> Self {
        self.reconfigure = reconfigure;
        self
    }

    fn base(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new("terraform")
            .arg(format!("-chdir={}", self.dir.display()))
            .arg(subcommand);
        if self.no_color {
            cmd = cmd.arg("-no-color");
        }
        cmd
    }

    fn with_vars(&self, mut cmd: Command) -> Command {
        for (k, v) in &self.vars {
            cmd = cmd.arg("-var").arg(format!("{k}={v}"));
        }
        cmd
    }

    #[must_use]
    pub fn init_command(&self) -> Command {
        let mut cmd = self.base("init").arg("-input=false");
        if self.reconfigure {
            cmd = cmd.arg("-reconfigure");
        }
        cmd
    }

    #[must_use]
    pub fn apply_command(&self) -> Command {
        self.with_vars(self.base("apply").args(["-auto-approve", "-input=false"]))
    }

    #[must_use]
    pub fn plan_command(&self) -> Command {
        self.with_vars(self.base("plan").args(["-detailed-exitcode", "-input=false"]))
    }

    /// Register this with a lifecycle so the module is destroyed at teardown.
    #[must_use]
    pub fn destroy_command(&self) -> Command {
        self.with_vars(self.base("destroy").args(["-auto-approve", "-input=false"]))
    }

    #[must_use]
    pub fn output_command(&self, name: &str) -> Command {
        let mut cmd = Command::new("terraform")
            .arg(format!("-chdir={}", self.dir.display()))
            .arg("output");
        if self.no_color {
            cmd = cmd.arg("-no-color");
        }
        cmd.args(["-json", name])
    }
}

/// Terraform operations against one working directory.
pub struct Terraform<'a, R> {
    runner: &'a R,
    options: TerraformOptions,
}

impl<'a, R: CommandRunner> Terraform<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, options: TerraformOptions) -> Self {
        Self { runner, options }
    }

    #[must_use]
    pub fn options(&self) -> &TerraformOptions {
        &self.options
    }

    /// # Errors
    ///
    /// Returns an error if `terraform init` fails.
    pub async fn init(&self) -> Result<CommandResult> {
        self.run_retrying(&self.options.init_command()).await
    }

    /// Apply, retrying only when the output matches a retryable error.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-retryable failure or once retries run out.
    pub async fn apply(&self) -> Result<CommandResult> {
        self.run_retrying(&self.options.apply_command()).await
    }

    /// # Errors
    ///
    /// Returns an error if either step fails.
    pub async fn init_and_apply(&self) -> Result<CommandResult> {
        self.init().await?;
        self.apply().await
    }

    /// Run `plan -detailed-exitcode`; exit code 2 is a success here.
    pub async fn plan(&self) -> PlanStatus {
        let result = self.runner.run(&self.options.plan_command()).await;
        let status = PlanStatus::from_exit_code(result.exit_code());
        tracing::info!(?status, "terraform plan finished");
        status
    }

    /// # Errors
    ///
    /// Returns an error if `terraform destroy` fails after retries.
    pub async fn destroy(&self) -> Result<CommandResult> {
        self.run_retrying(&self.options.destroy_command()).await
    }

    /// Parse `terraform output -json <name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or prints invalid JSON.
    pub async fn output_json(&self, name: &str) -> Result<serde_json::Value> {
        let result = self.runner.run(&self.options.output_command(name)).await;
        if let Some(err) = result.error {
            anyhow::bail!("terraform output {name} failed: {err}\n{}", result.output);
        }
        serde_json::from_str(result.output.trim())
            .with_context(|| format!("Error parsing output, invalid JSON: {}", result.output))
    }

    async fn run_retrying(&self, command: &Command) -> Result<CommandResult> {
        let max = self.options.max_retries.max(1);
        for attempt in 1..=max {
            let result = self.runner.run(command).await;
            let Some(err) = &result.error else {
                return Ok(result);
            };
            match self.options.retryable_errors.find(&result.output) {
                Some(pattern) if attempt < max => {
                    tracing::warn!(attempt, max_attempts = max, %pattern, "retryable terraform error");
                    tokio::time::sleep(self.options.retry_delay).await;
                }
                _ => anyhow::bail!("`{command}` failed: {err}\n{}", result.output),
            }
        }
        anyhow::bail!("`{command}` failed after {max} attempts")
    }
}
