//! `tfh env`: show the environment the harness would run with.

use anyhow::Result;

use crate::domain::context::{HarnessContext, HarnessEnv};
use crate::infra::env::HARNESS_ENV_VARS;
use crate::output::{OutputContext, json};

/// Run `tfh env`.
///
/// Prints every harness variable and whether it is set, then validates the
/// set as a [`HarnessContext`] would.
///
/// # Errors
///
/// Returns an error if `TF_VAR_project_id` is missing.
pub fn run(ctx: &OutputContext, json_out: bool, env: HarnessEnv) -> Result<()> {
    let values = [
        env.project_id.clone(),
        env.organization_id.clone(),
        env.billing_project_id.clone(),
        env.attachment_project_id.clone(),
        env.user_project_override.clone(),
        env.google_billing_project.clone(),
    ];

    if json_out {
        let vars: serde_json::Map<String, serde_json::Value> = HARNESS_ENV_VARS
            .iter()
            .zip(&values)
            .map(|(name, value)| ((*name).to_string(), serde_json::json!(value)))
            .collect();
        println!("{}", json::format_value(&vars)?);
    } else {
        ctx.header("Harness environment");
        for (name, value) in HARNESS_ENV_VARS.iter().zip(&values) {
            ctx.kv(name, value.as_deref().unwrap_or("(unset)"));
        }
    }

    let context = HarnessContext::from_env_values(env, String::new())?;
    if !json_out {
        ctx.success(&format!("billing project: {}", context.billing_project()));
    }
    Ok(())
}
