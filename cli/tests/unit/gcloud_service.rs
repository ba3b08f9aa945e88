//! Tests for the gcloud helpers.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio::time::Instant;

use tfh_cli::application::services::gcloud::{Ensured, describe_json, ensure_exists, project_number};
use tfh_cli::domain::Command;
use tfh_cli::domain::gcloud::json_query_str;
use tfh_cli::domain::policy::APP_ENGINE_SETTLE;

use crate::mocks::{fail, ok, ScriptedRunner};

#[tokio::test]
async fn project_number_takes_last_line_and_trims_quotes() {
    let runner = ScriptedRunner::new([ok("Updated property.\n'123456789012'\n\n")]);

    let number = project_number(&runner, "my-project").await.unwrap();

    assert_eq!(number, "123456789012");
    assert_eq!(
        runner.lines(),
        ["gcloud projects describe my-project --format=value(projectNumber)"]
    );
}

#[tokio::test]
async fn project_number_rejects_non_numeric_output() {
    let runner = ScriptedRunner::new([ok("not-a-number")]);

    assert!(project_number(&runner, "p").await.is_err());
}

#[tokio::test]
async fn project_number_propagates_command_failure() {
    let runner = ScriptedRunner::new([fail("PERMISSION_DENIED")]);

    let err = project_number(&runner, "p").await.unwrap_err();

    assert!(err.to_string().contains("PERMISSION_DENIED"));
}

#[tokio::test]
async fn describe_json_appends_format_and_parses() {
    let runner = ScriptedRunner::new([ok(r#"{"status": "READY", "nodes": [{"ip": "10.0.0.2"}]}"#)]);
    let describe = Command::gcloud(["alloydb", "clusters", "describe", "c-1"]);

    let value = describe_json(&runner, &describe).await.unwrap();

    assert_eq!(json_query_str(&value, "nodes.0.ip").unwrap(), "10.0.0.2");
    assert!(runner.lines()[0].ends_with("--format=json"));
}

#[tokio::test]
async fn ensure_exists_skips_create_when_present() {
    let runner = ScriptedRunner::new([ok("id: apps/p")]);
    let describe = Command::gcloud(["app", "describe"]);
    let create = Command::gcloud(["app", "create", "--region=us-central"]);

    let ensured = ensure_exists(&runner, &describe, &create, "does not exist", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(ensured, Ensured::AlreadyPresent);
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test]
async fn ensure_exists_creates_when_missing() {
    let runner = ScriptedRunner::new([fail("ERROR: The app does not exist"), ok("")]);
    let describe = Command::gcloud(["app", "describe"]);
    let create = Command::gcloud(["app", "create", "--region=us-central"]);

    let ensured = ensure_exists(&runner, &describe, &create, "does not exist", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(ensured, Ensured::Created);
    assert_eq!(runner.lines()[1], "gcloud app create --region=us-central");
}

#[tokio::test(start_paused = true)]
async fn ensure_exists_waits_for_settle_after_create() {
    let runner = ScriptedRunner::new([fail("ERROR: The app does not exist"), ok("")]);
    let describe = Command::gcloud(["app", "describe"]);
    let create = Command::gcloud(["app", "create", "--region=us-central"]);
    let start = Instant::now();

    let ensured = ensure_exists(&runner, &describe, &create, "does not exist", APP_ENGINE_SETTLE)
        .await
        .unwrap();

    assert_eq!(ensured, Ensured::Created);
    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn ensure_exists_does_not_settle_when_present() {
    let runner = ScriptedRunner::new([ok("id: apps/p")]);
    let describe = Command::gcloud(["app", "describe"]);
    let create = Command::gcloud(["app", "create", "--region=us-central"]);
    let start = Instant::now();

    let ensured = ensure_exists(&runner, &describe, &create, "does not exist", APP_ENGINE_SETTLE)
        .await
        .unwrap();

    assert_eq!(ensured, Ensured::AlreadyPresent);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn ensure_exists_fails_on_unexpected_describe_error() {
    let runner = ScriptedRunner::new([fail("PERMISSION_DENIED")]);
    let describe = Command::gcloud(["app", "describe"]);
    let create = Command::gcloud(["app", "create"]);

    let result = ensure_exists(&runner, &describe, &create, "does not exist", Duration::ZERO).await;

    assert!(result.is_err());
    assert_eq!(runner.call_count(), 1);
}
