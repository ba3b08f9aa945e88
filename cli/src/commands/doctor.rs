//! `tfh doctor`: check that the tools and variables the harness needs are
//! available.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::application::ports::CommandRunner;
use crate::domain::command::Command;
use crate::domain::context::HarnessEnv;
use crate::output::{OutputContext, json};

// ── Public types ──────────────────────────────────────────────────────────────

/// Availability of one external tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolCheck {
    pub name: String,
    pub available: bool,
    /// First line of the version output when available.
    pub version: Option<String>,
}

/// Everything `tfh doctor` reports.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorChecks {
    pub tools: Vec<ToolCheck>,
    pub project_id_set: bool,
    pub billing_project: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run `tfh doctor`.
///
/// # Errors
///
/// Returns an error if the environment cannot be read or any check fails.
pub async fn run(
    ctx: &OutputContext,
    json_out: bool,
    runner: &impl CommandRunner,
    env: &HarnessEnv,
) -> Result<()> {
    let checks = gather(runner, env).await;
    let issues = collect_issues(&checks);

    if json_out {
        let out = serde_json::json!({
            "status": if issues.is_empty() { "healthy" } else { "unhealthy" },
            "checks": checks,
            "issues": issues,
        });
        println!("{}", json::format_value(&out)?);
    } else {
        ctx.header("Harness Health Check");
        for tool in &checks.tools {
            let label = match &tool.version {
                Some(v) => format!("{}: {v}", tool.name),
                None => format!("{} not found on PATH", tool.name),
            };
            print_check(ctx, tool.available, &label);
        }
        print_check(ctx, checks.project_id_set, "TF_VAR_project_id is set");
        if let Some(billing) = &checks.billing_project {
            ctx.kv("billing project", billing);
        }
        if issues.is_empty() {
            ctx.success("Everything looks good!");
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("found {} issue(s): {}", issues.len(), issues.join("; "))
    }
}

/// Check each tool with its version command and inspect the environment.
pub async fn gather(runner: &impl CommandRunner, env: &HarnessEnv) -> DoctorChecks {
    let (gcloud, terraform) = tokio::join!(
        check_tool(runner, "gcloud", &["--version"]),
        check_tool(runner, "terraform", &["version"]),
    );
    let project_id_set = env
        .project_id
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    let billing_project = env
        .billing_project_id
        .clone()
        .or_else(|| env.google_billing_project.clone());
    DoctorChecks {
        tools: vec![gcloud, terraform],
        project_id_set,
        billing_project,
    }
}

async fn check_tool(runner: &impl CommandRunner, name: &str, args: &[&str]) -> ToolCheck {
    let result = runner.run(&Command::new(name).args(args.iter().copied())).await;
    let version = result
        .is_success()
        .then(|| result.output.lines().find(|l| !l.trim().is_empty()))
        .flatten()
        .map(|l| l.trim().to_string());
    ToolCheck {
        name: name.to_string(),
        available: result.is_success(),
        version,
    }
}

fn print_check(ctx: &OutputContext, ok: bool, msg: &str) {
    if ctx.quiet {
        return;
    }
    if ok {
        println!("    {} {msg}", "✓".style(ctx.styles.success));
    } else {
        println!("    {} {msg}", "✗".style(ctx.styles.error));
    }
}

// ── Issue collection ──────────────────────────────────────────────────────────

/// Collect actionable issues from check results.
#[must_use]
pub fn collect_issues(checks: &DoctorChecks) -> Vec<String> {
    let mut issues: Vec<String> = checks
        .tools
        .iter()
        .filter(|t| !t.available)
        .map(|t| format!("{} is not installed or not on PATH", t.name))
        .collect();
    if !checks.project_id_set {
        issues.push("TF_VAR_project_id is not set".to_string());
    }
    issues
}
