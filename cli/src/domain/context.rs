//! Per-run harness context: project identifiers and unique resource names.
//!
//! Built once per test run and passed into each test. Loading from the
//! process environment lives in `crate::infra::env`.

use serde::{Deserialize, Serialize};

use crate::domain::error::ContextError;

/// Raw values of the environment variables the harness reads.
///
/// Field names follow the lowercased variable names so `envy` can fill them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HarnessEnv {
    #[serde(rename = "tf_var_project_id")]
    pub project_id: Option<String>,
    #[serde(rename = "tf_var_organization_id")]
    pub organization_id: Option<String>,
    #[serde(rename = "tf_var_billing_project_id")]
    pub billing_project_id: Option<String>,
    #[serde(rename = "tf_var_attachment_project_id")]
    pub attachment_project_id: Option<String>,
    #[serde(rename = "user_project_override")]
    pub user_project_override: Option<String>,
    #[serde(rename = "google_billing_project")]
    pub google_billing_project: Option<String>,
}

/// Explicit configuration handed to every test.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HarnessContext {
    pub project_id: String,
    pub organization_id: Option<String>,
    pub billing_project_id: Option<String>,
    pub attachment_project_id: Option<String>,
    pub user_project_override: bool,
    pub google_billing_project: Option<String>,
    pub run_suffix: String,
}

impl HarnessContext {
    /// Validate raw environment values.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingProjectId`] when `TF_VAR_project_id` is
    /// unset or blank.
    pub fn from_env_values(env: HarnessEnv, run_suffix: String) -> Result<Self, ContextError> {
        let project_id = non_blank(env.project_id).ok_or(ContextError::MissingProjectId)?;
        Ok(Self {
            project_id,
            organization_id: non_blank(env.organization_id),
            billing_project_id: non_blank(env.billing_project_id),
            attachment_project_id: non_blank(env.attachment_project_id),
            user_project_override: env
                .user_project_override
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
            google_billing_project: non_blank(env.google_billing_project),
            run_suffix,
        })
    }

    /// `<prefix>-<suffix>`, for networks, VMs, policies and other
    /// hyphenated GCP names.
    #[must_use]
    pub fn name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.run_suffix)
    }

    /// `<prefix>_<suffix>`, for BigQuery datasets and other identifiers that
    /// reject hyphens.
    #[must_use]
    pub fn underscored_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.run_suffix)
    }

    /// Project that bills API calls: the explicit billing project when set,
    /// otherwise the test project.
    #[must_use]
    pub fn billing_project(&self) -> &str {
        self.billing_project_id
            .as_deref()
            .or(self.google_billing_project.as_deref())
            .unwrap_or(&self.project_id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Generate a short suffix that is unique per test run.
///
/// 8 lowercase hex chars: valid inside every GCP resource name and short
/// enough to stay under the 63-character limit.
#[must_use]
pub fn generate_run_suffix() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    hasher.write_u64(RandomState::new().build_hasher().finish());
    format!("{:08x}", hasher.finish() & 0xffff_ffff)
}
