//! Tests for `poll_until` and the serial-port wrapper.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tfh_cli::application::services::gcloud::wait_for_serial_marker;
use tfh_cli::application::services::poll::poll_until;
use tfh_cli::domain::{Command, HarnessError, PollPolicy};
use tokio::time::Instant;

use crate::mocks::{fail, ok, ScriptedRunner};

fn inspect() -> Command {
    Command::gcloud(["compute", "instances", "get-serial-port-output", "vm-1"])
}

fn policy(max: u32) -> PollPolicy {
    PollPolicy::new(max, Duration::from_secs(10), "DONE", "ERR").unwrap()
}

#[tokio::test(start_paused = true)]
async fn stops_at_first_success_marker() {
    let runner = ScriptedRunner::new([ok(""), ok(""), ok("... DONE"), ok("DONE")]);
    let start = Instant::now();

    let report = poll_until(&runner, &inspect(), &policy(5)).await.unwrap();

    assert_eq!(report.inspections, 3);
    assert_eq!(report.output, "... DONE");
    assert_eq!(runner.call_count(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn failure_marker_stops_immediately() {
    let runner = ScriptedRunner::new([ok("booting"), ok("step 1 ERR: disk full"), ok("DONE")]);

    let err = poll_until(&runner, &inspect(), &policy(5)).await.unwrap_err();

    assert_eq!(runner.call_count(), 2);
    match err {
        HarnessError::PollFailed {
            marker,
            inspection,
            output,
            ..
        } => {
            assert_eq!(marker, "ERR");
            assert_eq!(inspection, 2);
            assert!(output.contains("disk full"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn success_marker_wins_when_both_present() {
    let runner = ScriptedRunner::new([ok("ERR (retrying)\nDONE")]);

    let report = poll_until(&runner, &inspect(), &policy(3)).await.unwrap();

    assert_eq!(report.inspections, 1);
}

#[tokio::test(start_paused = true)]
async fn times_out_after_budget_without_marker() {
    let runner = ScriptedRunner::always(ok("still booting"));
    let start = Instant::now();

    let err = poll_until(&runner, &inspect(), &policy(4)).await.unwrap_err();

    assert_eq!(runner.call_count(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert!(matches!(err, HarnessError::PollTimedOut { attempts: 4, .. }));
    assert!(err.to_string().contains("never observed after 4 inspections"));
}

#[tokio::test(start_paused = true)]
async fn transient_inspection_error_keeps_polling() {
    let runner = ScriptedRunner::new([fail("503 backend error"), fail("ERR-like API noise"), ok("DONE")]);

    let report = poll_until(&runner, &inspect(), &policy(5)).await.unwrap();

    assert_eq!(report.inspections, 3);
}

#[tokio::test(start_paused = true)]
async fn initial_delay_precedes_first_inspection() {
    let runner = ScriptedRunner::new([ok("DONE")]);
    let policy = policy(3).with_initial_delay(Duration::from_secs(60));
    let start = Instant::now();

    poll_until(&runner, &inspect(), &policy).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn serial_marker_polls_port_one() {
    let runner = ScriptedRunner::new([ok("startup-script: SUCCESS")]);
    let policy = PollPolicy::new(24, Duration::from_secs(10), "SUCCESS", "FAILURE").unwrap();

    wait_for_serial_marker(&runner, "proj", "vm-abc", "us-central1-a", &policy)
        .await
        .unwrap();

    assert_eq!(
        runner.lines(),
        ["gcloud compute instances get-serial-port-output vm-abc --project=proj --zone=us-central1-a --port=1"]
    );
}
