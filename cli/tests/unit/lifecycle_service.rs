//! Tests for `Lifecycle` teardown ordering and `scoped`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tfh_cli::application::services::lifecycle::{Lifecycle, scoped};
use tfh_cli::domain::{Command, Outcome, RetryPolicy};
use tokio::time::Instant;

use crate::mocks::{fail, ok, ScriptedRunner};

fn delete(name: &str) -> Command {
    Command::gcloud(["compute", "networks", "delete", name, "--quiet"])
}

#[tokio::test]
async fn teardown_runs_in_reverse_registration_order() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    lifecycle.register("A", delete("a"));
    lifecycle.register("B", delete("b"));
    lifecycle.register("C", delete("c"));

    let report = lifecycle.teardown(&runner).await;

    assert_eq!(report.labels(), ["C", "B", "A"]);
    assert_eq!(
        runner.lines(),
        [
            "gcloud compute networks delete c --quiet",
            "gcloud compute networks delete b --quiet",
            "gcloud compute networks delete a --quiet",
        ]
    );
    assert!(report.is_clean());
}

#[tokio::test]
async fn not_found_delete_is_benign() {
    let runner = ScriptedRunner::new([
        fail("ERROR: The resource 'projects/p/global/networks/a' was not found"),
        fail("bucket already deleted"),
    ]);
    let lifecycle = Lifecycle::new();
    lifecycle.register("network", delete("a"));
    lifecycle.register("bucket", delete("b"));

    let report = lifecycle.teardown(&runner).await;

    assert!(report.is_clean());
    assert_eq!(
        report.entries[0].outcome,
        Outcome::BenignFailure("was not found".to_string())
    );
    assert_eq!(
        report.entries[1].outcome,
        Outcome::BenignFailure("already deleted".to_string())
    );
}

#[tokio::test]
async fn fatal_delete_failure_does_not_stop_teardown() {
    let runner = ScriptedRunner::new([fail("permission denied"), ok("")]);
    let lifecycle = Lifecycle::new();
    lifecycle.register("first", delete("a"));
    lifecycle.register("second", delete("b"));

    let report = lifecycle.teardown(&runner).await;

    assert_eq!(runner.call_count(), 2);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].label, "second");
}

#[tokio::test]
async fn second_teardown_is_a_noop() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    lifecycle.register("only", delete("a"));

    lifecycle.teardown(&runner).await;
    let again = lifecycle.teardown(&runner).await;

    assert!(again.entries.is_empty());
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test]
async fn acquire_registers_delete_even_when_create_fails() {
    let runner = ScriptedRunner::new([fail("create failed"), ok("")]);
    let lifecycle = Lifecycle::new();
    let create = Command::gcloud(["compute", "networks", "create", "a"]);

    let err = lifecycle
        .acquire(&runner, "network", &create, delete("a"), &RetryPolicy::once())
        .await;

    assert!(err.is_err());
    assert_eq!(lifecycle.pending(), ["network"]);
    lifecycle.teardown(&runner).await;
    assert_eq!(runner.lines()[1], "gcloud compute networks delete a --quiet");
}

#[tokio::test]
async fn local_cleanup_runs_in_order_with_commands() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    let removed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&removed);
    lifecycle.register_local("config file", move || {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });
    lifecycle.register("network", delete("a"));

    let report = lifecycle.teardown(&runner).await;

    assert_eq!(report.labels(), ["network", "config file"]);
    assert!(removed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failing_local_cleanup_is_reported() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    lifecycle.register_local("tempdir", || anyhow::bail!("busy"));

    let report = lifecycle.teardown(&runner).await;

    assert_eq!(report.entries[0].outcome, Outcome::FatalFailure("busy".to_string()));
}

#[tokio::test]
async fn panicking_local_cleanup_does_not_skip_older_deletes() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    lifecycle.register("network", delete("a"));
    lifecycle.register_local("config", || panic!("config dir vanished"));

    let report = lifecycle.teardown(&runner).await;

    assert_eq!(report.labels(), ["config", "network"]);
    assert_eq!(
        report.entries[0].outcome,
        Outcome::FatalFailure("cleanup panicked: config dir vanished".to_string())
    );
    assert_eq!(report.entries[1].outcome, Outcome::Success);
    assert_eq!(runner.lines(), ["gcloud compute networks delete a --quiet"]);
    assert!(lifecycle.pending().is_empty());
}

#[tokio::test]
async fn scoped_keeps_body_panic_when_cleanup_also_panics() {
    let runner = ScriptedRunner::new([]);

    let caught = futures_util::FutureExt::catch_unwind(std::panic::AssertUnwindSafe(scoped(
        &runner,
        |lc| async move {
            lc.register("network", delete("a"));
            lc.register_local("config", || panic!("cleanup panic"));
            if lc.pending().len() == 2 {
                panic!("body panic");
            }
            Ok(())
        },
    )))
    .await;

    let payload = caught.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"body panic"));
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn settle_time_waits_after_delete() {
    let runner = ScriptedRunner::new([]);
    let lifecycle = Lifecycle::new();
    lifecycle.register_with_settle("peering", delete("p"), Duration::from_secs(60));
    let start = Instant::now();

    lifecycle.teardown(&runner).await;

    assert_eq!(start.elapsed(), Duration::from_secs(60));
}

#[tokio::test]
async fn scoped_tears_down_after_success() {
    let runner = ScriptedRunner::new([]);

    let value = scoped(&runner, |lc| async move {
        lc.register("A", delete("a"));
        lc.register("B", delete("b"));
        Ok(42)
    })
    .await
    .unwrap();

    assert_eq!(value, 42);
    assert_eq!(runner.call_count(), 2);
    assert!(runner.lines()[0].contains("delete b"));
}

#[tokio::test]
async fn scoped_tears_down_after_error() {
    let runner = ScriptedRunner::new([]);

    let result: anyhow::Result<()> = scoped(&runner, |lc| async move {
        lc.register("A", delete("a"));
        anyhow::bail!("assertion failed")
    })
    .await;

    assert_eq!(result.unwrap_err().to_string(), "assertion failed");
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test]
async fn scoped_tears_down_after_panic_and_resumes_it() {
    let runner = ScriptedRunner::new([]);

    let caught = futures_util::FutureExt::catch_unwind(std::panic::AssertUnwindSafe(scoped(
        &runner,
        |lc| async move {
            lc.register("A", delete("a"));
            lc.register("B", delete("b"));
            if lc.pending().len() == 2 {
                panic!("assertion in test body");
            }
            Ok(())
        },
    )))
    .await;

    assert!(caught.is_err());
    assert_eq!(
        runner.lines(),
        [
            "gcloud compute networks delete b --quiet",
            "gcloud compute networks delete a --quiet",
        ]
    );
}
