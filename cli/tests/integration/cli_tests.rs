//! End-to-end tests of the `tfh` binary.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn tfh() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tfh"));
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "warn");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    tfh().assert().code(2).stderr(predicate::str::contains(
        "Retry, poll and teardown harness",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    tfh()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("retry"))
        .stdout(predicate::str::contains("poll"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = tfh().args(["version", "--json"]).output().expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

// --- retry ---

#[test]
fn test_retry_prints_output_of_successful_command() {
    tfh()
        .args(["retry", "--delay", "0", "--", "sh", "-c", "echo created"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
}

#[test]
fn test_retry_exhausts_attempts_and_exits_one() {
    tfh()
        .args([
            "retry", "--attempts", "2", "--delay", "0", "--", "sh", "-c", "echo quota; exit 3",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed after 2 attempts"))
        .stderr(predicate::str::contains("exit status 3"));
}

#[test]
fn test_retry_succeeds_after_transient_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let marker = dir.path().join("seen");
    let script = format!(
        "if [ -f {m} ]; then echo ok; else touch {m}; exit 1; fi",
        m = marker.display()
    );
    tfh()
        .args(["retry", "--attempts", "3", "--delay", "0", "--", "sh", "-c", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn test_retry_benign_failure_exits_zero() {
    tfh()
        .args([
            "--json", "retry", "--delay", "0", "--benign", "already exists", "--", "sh", "-c",
            "echo 'network already exists' >&2; exit 1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "benign""#));
}

#[test]
fn test_retry_benign_failure_reports_command_output() {
    let output = tfh()
        .args([
            "--json", "retry", "--delay", "0", "--benign", "already exists", "--", "sh", "-c",
            "echo 'network already exists' >&2; exit 1",
        ])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["reason"], "already exists");
    assert_eq!(v["output"], "network already exists\n");
}

#[test]
fn test_retry_benign_failure_prints_output_without_json() {
    tfh()
        .args([
            "retry", "--delay", "0", "--benign", "not found", "--", "sh", "-c",
            "echo 'bucket not found'; exit 1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("bucket not found"));
}

#[test]
fn test_retry_rejects_zero_attempts() {
    tfh()
        .args(["retry", "--attempts", "0", "--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_retry_requires_a_command() {
    tfh().arg("retry").assert().code(2);
}

// --- poll ---

#[test]
fn test_poll_succeeds_when_marker_present() {
    tfh()
        .args([
            "--json", "poll", "--success", "DONE", "--failure", "FAILED", "--attempts", "2",
            "--interval", "0", "--", "sh", "-c", "echo startup DONE",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""inspections": 1"#));
}

#[test]
fn test_poll_fails_on_failure_marker() {
    tfh()
        .args([
            "poll", "--success", "DONE", "--failure", "FAILED", "--attempts", "3", "--interval",
            "0", "--", "sh", "-c", "echo script FAILED",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failure marker 'FAILED'"));
}

#[test]
fn test_poll_times_out_without_marker() {
    tfh()
        .args([
            "poll", "--success", "DONE", "--failure", "FAILED", "--attempts", "2", "--interval",
            "0", "--", "sh", "-c", "echo booting",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("never observed after 2 inspections"));
}

#[test]
fn test_poll_rejects_identical_markers() {
    tfh()
        .args(["poll", "--success", "X", "--failure", "X", "--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must differ"));
}

// --- env ---

#[test]
fn test_env_without_project_id_fails() {
    tfh()
        .arg("env")
        .env_remove("TF_VAR_project_id")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TF_VAR_project_id is not set"));
}

#[test]
fn test_env_json_lists_variables() {
    let output = tfh()
        .args(["env", "--json"])
        .env("TF_VAR_project_id", "proj-1")
        .env_remove("TF_VAR_organization_id")
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["TF_VAR_project_id"], "proj-1");
    assert!(v["TF_VAR_organization_id"].is_null());
}

// --- JSON errors ---

#[test]
fn test_json_error_object_carries_error_code() {
    let output = tfh()
        .args([
            "--json", "retry", "--attempts", "1", "--delay", "0", "--", "sh", "-c", "exit 2",
        ])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "RETRIES_EXHAUSTED");
    assert!(
        v["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed after 1 attempts"))
    );
}

#[test]
fn test_json_error_for_missing_project_id() {
    let output = tfh()
        .args(["env", "--json"])
        .env_remove("TF_VAR_project_id")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // the variable listing comes first, the error object last
    let start = stdout.rfind("\n{").expect("error object") + 1;
    let v: serde_json::Value = serde_json::from_str(&stdout[start..]).expect("json");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "MISSING_PROJECT_ID");
}
