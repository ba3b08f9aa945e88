//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use crate::domain::command::{Command, CommandResult};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Implementations never fail: a non-zero exit, a spawn failure and a timeout
/// are all reported inside the returned [`CommandResult`], with whatever
/// output the process produced.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `command` to completion and capture stdout+stderr combined.
    async fn run(&self, command: &Command) -> CommandResult;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    async fn run(&self, command: &Command) -> CommandResult {
        (**self).run(command).await
    }
}
