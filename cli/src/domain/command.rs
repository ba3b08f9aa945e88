//! External command values and their captured results.
//!
//! Pure data: nothing here spawns a process.

use std::fmt;
use std::time::Duration;

/// One external command: program, ordered arguments and environment overrides.
///
/// Builder methods consume `self` and return a new value, so a `Command` never
/// changes once it has been handed to a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl Command {
    /// Create a command for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Shorthand for a `gcloud` invocation.
    #[must_use]
    pub fn gcloud<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("gcloud").args(args)
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process. A later value for
    /// the same key replaces the earlier one.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Why an invocation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The process ran and exited non-zero.
    Exit(i32),
    /// The process was terminated by a signal.
    Signal,
    /// The process never started (program not on `PATH`, permissions, ...).
    Spawn(String),
    /// The runner killed the process after its timeout.
    Timeout(Duration),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit(code) => write!(f, "exit status {code}"),
            Self::Signal => f.write_str("terminated by signal"),
            Self::Spawn(reason) => write!(f, "failed to spawn: {reason}"),
            Self::Timeout(after) => write!(f, "timed out after {after:?}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Result of exactly one invocation: combined stdout+stderr plus the error,
/// if any. Output is kept on failure so callers can inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub error: Option<CommandError>,
}

impl CommandResult {
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(output: impl Into<String>, error: CommandError) -> Self {
        Self {
            output: output.into(),
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Exit code of the process, when it ran to completion.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match &self.error {
            None => Some(0),
            Some(CommandError::Exit(code)) => Some(*code),
            Some(_) => None,
        }
    }

    /// Case-sensitive substring check on the captured output.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.output.contains(needle)
    }
}
