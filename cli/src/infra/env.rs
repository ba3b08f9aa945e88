//! Load the [`HarnessContext`] from process environment variables.

use anyhow::{Context, Result, anyhow};

use crate::domain::context::{HarnessContext, HarnessEnv, generate_run_suffix};

/// Environment variables the harness reads, in the order `tfh env` shows them.
pub const HARNESS_ENV_VARS: &[&str] = &[
    "TF_VAR_project_id",
    "TF_VAR_organization_id",
    "TF_VAR_billing_project_id",
    "TF_VAR_ATTACHMENT_PROJECT_ID",
    "USER_PROJECT_OVERRIDE",
    "GOOGLE_BILLING_PROJECT",
];

/// Read the raw variables without validating them.
///
/// Only [`HARNESS_ENV_VARS`] are looked at, so unrelated variables with
/// non-UTF-8 values do not matter.
///
/// # Errors
///
/// Returns an error if one of the harness variables holds non-UTF-8 data.
pub fn read_env() -> Result<HarnessEnv> {
    let mut vars = Vec::with_capacity(HARNESS_ENV_VARS.len());
    for &name in HARNESS_ENV_VARS {
        if let Some(value) = std::env::var_os(name) {
            let value = value
                .into_string()
                .map_err(|_| anyhow!("{name} is not valid UTF-8"))?;
            vars.push((name.to_string(), value));
        }
    }
    envy::from_iter::<_, HarnessEnv>(vars).context("failed to read harness environment variables")
}

/// Build the context for this run with a fresh unique suffix.
///
/// Call this before touching any cloud resource: a missing
/// `TF_VAR_project_id` fails here.
///
/// # Errors
///
/// Returns an error if `TF_VAR_project_id` is unset.
pub fn load_context() -> Result<HarnessContext> {
    let env = read_env()?;
    let ctx = HarnessContext::from_env_values(env, generate_run_suffix())?;
    tracing::info!(project_id = %ctx.project_id, run_suffix = %ctx.run_suffix, "harness context loaded");
    Ok(ctx)
}
