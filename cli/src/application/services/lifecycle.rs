//! Create/delete pairing with guaranteed, reverse-order teardown.
//!
//! Every delete is registered *before* its create runs, so a create that
//! half-succeeds still gets a best-effort delete. Teardown drains the stack
//! last-in first-out: subnets before networks, rules before policies.
//!
//! Cleanup failures never propagate. They are logged and recorded in the
//! [`TeardownReport`]; the test has already succeeded or failed by then.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt as _;

use crate::application::ports::CommandRunner;
use crate::application::services::retry::run_with_retry;
use crate::domain::command::{Command, CommandResult};
use crate::domain::error::HarnessError;
use crate::domain::outcome::{BenignPatterns, Outcome};
use crate::domain::policy::RetryPolicy;

type LocalCleanup = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

enum Release {
    Command(Command),
    Local(LocalCleanup),
}

struct Pair {
    label: String,
    release: Release,
    settle: Duration,
}

/// One executed cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownEntry {
    pub label: String,
    pub outcome: Outcome,
}

/// Cleanups in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub entries: Vec<TeardownEntry>,
}

impl TeardownReport {
    /// Labels in execution order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Entries whose delete failed for a non-benign reason.
    #[must_use]
    pub fn failures(&self) -> Vec<&TeardownEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_ok()).collect()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Stack of pending cleanups for one test scope.
///
/// Cloning yields another handle to the same stack.
#[derive(Clone)]
pub struct Lifecycle {
    stack: Arc<Mutex<Vec<Pair>>>,
    benign: BenignPatterns,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Empty stack; deletes treat [`BenignPatterns::not_found`] as success.
    #[must_use]
    pub fn new() -> Self {
        Self::with_benign_patterns(BenignPatterns::not_found())
    }

    #[must_use]
    pub fn with_benign_patterns(benign: BenignPatterns) -> Self {
        Self {
            stack: Arc::new(Mutex::new(Vec::new())),
            benign,
        }
    }

    fn push(&self, pair: Pair) {
        tracing::debug!(label = %pair.label, "cleanup registered");
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pair);
    }

    fn pop(&self) -> Option<Pair> {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Schedule `delete` to run at teardown.
    pub fn register(&self, label: impl Into<String>, delete: Command) {
        self.register_with_settle(label, delete, Duration::ZERO);
    }

    /// Schedule `delete` and wait `settle` after it runs, for APIs that
    /// report a deletion before dependents can observe it.
    pub fn register_with_settle(&self, label: impl Into<String>, delete: Command, settle: Duration) {
        self.push(Pair {
            label: label.into(),
            release: Release::Command(delete),
            settle,
        });
    }

    /// Schedule an in-process cleanup (removing generated config files,
    /// temporary directories).
    pub fn register_local<F>(&self, label: impl Into<String>, cleanup: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.push(Pair {
            label: label.into(),
            release: Release::Local(Box::new(cleanup)),
            settle: Duration::ZERO,
        });
    }

    /// Register `delete`, then run `create` under `policy`.
    ///
    /// The delete stays scheduled whatever `create` does.
    ///
    /// # Errors
    ///
    /// Returns the create's [`HarnessError`] when every attempt failed.
    pub async fn acquire(
        &self,
        runner: &impl CommandRunner,
        label: impl Into<String>,
        create: &Command,
        delete: Command,
        policy: &RetryPolicy,
    ) -> Result<CommandResult, HarnessError> {
        let label = label.into();
        self.register(label.clone(), delete);
        tracing::info!(%label, "creating");
        run_with_retry(runner, create, policy).await
    }

    /// Labels still pending, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.label.clone())
            .collect()
    }

    /// Run every pending cleanup, newest first, exactly once. A local
    /// cleanup that panics is recorded as a failure and the rest still run.
    ///
    /// A second call finds the stack empty and does nothing.
    pub async fn teardown(&self, runner: &impl CommandRunner) -> TeardownReport {
        let mut report = TeardownReport::default();
        while let Some(pair) = self.pop() {
            tracing::info!(label = %pair.label, "tearing down");
            let outcome = match pair.release {
                Release::Command(delete) => {
                    let result = runner.run(&delete).await;
                    Outcome::classify(&result, &self.benign)
                }
                Release::Local(cleanup) => match std::panic::catch_unwind(AssertUnwindSafe(cleanup)) {
                    Ok(Ok(())) => Outcome::Success,
                    Ok(Err(e)) => Outcome::FatalFailure(format!("{e:#}")),
                    Err(panic) => Outcome::FatalFailure(format!(
                        "cleanup panicked: {}",
                        panic_message(panic.as_ref())
                    )),
                },
            };
            match &outcome {
                Outcome::Success => tracing::info!(label = %pair.label, "deleted"),
                Outcome::BenignFailure(reason) => {
                    tracing::info!(label = %pair.label, %reason, "already gone");
                }
                Outcome::FatalFailure(detail) => tracing::warn!(
                    label = %pair.label,
                    %detail,
                    "cleanup failed, this may require manual cleanup"
                ),
            }
            if !pair.settle.is_zero() {
                tokio::time::sleep(pair.settle).await;
            }
            report.entries.push(TeardownEntry {
                label: pair.label,
                outcome,
            });
        }
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Run `body` with a fresh [`Lifecycle`] and tear it down afterwards.
///
/// Teardown runs when `body` returns `Ok`, returns `Err`, or panics. A panic
/// is resumed after teardown so the test still fails.
///
/// # Errors
///
/// Returns whatever error `body` returned.
pub async fn scoped<R, F, Fut, T>(runner: &R, body: F) -> anyhow::Result<T>
where
    R: CommandRunner,
    F: FnOnce(Lifecycle) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let lifecycle = Lifecycle::new();
    let outcome = AssertUnwindSafe(body(lifecycle.clone()))
        .catch_unwind()
        .await;
    let report = lifecycle.teardown(runner).await;
    if !report.is_clean() {
        tracing::warn!(
            failed = report.failures().len(),
            total = report.entries.len(),
            "teardown finished with failures"
        );
    }
    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
