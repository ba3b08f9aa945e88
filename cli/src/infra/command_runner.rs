//! Spawns gcloud, terraform and friends as child processes.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::CommandRunner;
use crate::domain::command::{Command, CommandError, CommandResult};

/// Default timeout for gcloud calls. Long-running operations (AlloyDB
/// clusters, VPC peerings) routinely take several minutes.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Runs a [`Command`] and returns stdout and stderr combined.
///
/// A command that outlives the timeout is killed explicitly and reported as
/// [`CommandError::Timeout`] together with the output it printed so far.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &Command) -> CommandResult {
        let program = command.program();
        tracing::debug!(%command, "running");

        let spawned = tokio::process::Command::new(program)
            .args(command.get_args())
            .envs(command.get_env().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(%command, error = %e, "failed to spawn");
                return CommandResult::failure("", CommandError::Spawn(e.to_string()));
            }
        };

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // Read both pipes concurrently with wait(); a child that fills the
        // pipe buffer blocks until someone drains it. The buffers outlive the
        // select so a timed-out command keeps what it printed.
        let result = tokio::select! {
            (status, (), ()) = async {
                tokio::join!(
                    child.wait(),
                    drain(stdout_handle.as_mut(), &mut stdout),
                    drain(stderr_handle.as_mut(), &mut stderr),
                )
            } => {
                let output = combine(&stdout, &stderr);
                match status {
                    Ok(s) if s.success() => CommandResult::success(output),
                    Ok(s) => match s.code() {
                        Some(code) => CommandResult::failure(output, CommandError::Exit(code)),
                        None => CommandResult::failure(output, CommandError::Signal),
                    },
                    Err(e) => CommandResult::failure(output, CommandError::Spawn(e.to_string())),
                }
            }
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                CommandResult::failure(combine(&stdout, &stderr), CommandError::Timeout(self.timeout))
            }
        };

        match &result.error {
            None => tracing::info!(%command, "command succeeded"),
            Some(err) => tracing::warn!(%command, error = %err, "command failed"),
        }
        result
    }
}

/// Append everything read from `pipe` to `buf`, chunk by chunk, so a
/// cancelled read leaves the bytes seen so far in place.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<&mut R>, buf: &mut Vec<u8>) {
    let Some(pipe) = pipe else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// stdout followed by stderr, lossily decoded.
fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let mut out = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&String::from_utf8_lossy(stderr));
    }
    out
}
