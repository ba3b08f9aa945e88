//! Pure helpers for gcloud arguments and output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::command::Command;
use crate::domain::error::ContextError;

static ZONE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(?:-[a-z0-9]+)+-[a-z]$").ok());

/// Region part of a zone: `us-central1-a` → `us-central1`.
///
/// # Errors
///
/// Returns [`ContextError::InvalidZone`] when `zone` is not of the form
/// `<region>-<letter>`.
pub fn region_from_zone(zone: &str) -> Result<&str, ContextError> {
    let valid = ZONE_RE.as_ref().is_some_and(|re| re.is_match(zone));
    match zone.rfind('-') {
        Some(idx) if valid => Ok(&zone[..idx]),
        _ => Err(ContextError::InvalidZone(zone.to_string())),
    }
}

/// Extract a project number from `gcloud projects describe
/// --format=value(projectNumber)` output.
///
/// gcloud may print warnings first (impersonation notices), so the number is
/// taken from the last non-empty line with surrounding single quotes trimmed.
///
/// # Errors
///
/// Returns [`ContextError::InvalidProjectNumber`] when that line is not an
/// integer.
pub fn parse_project_number(output: &str) -> Result<String, ContextError> {
    let last = output
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("")
        .trim_matches('\'');
    if last.parse::<u64>().is_err() {
        return Err(ContextError::InvalidProjectNumber {
            value: last.to_string(),
            output: output.to_string(),
        });
    }
    Ok(last.to_string())
}

/// Look up a dotted path in parsed JSON output: `cluster.network_config.0`.
///
/// Object segments are keys; numeric segments index arrays. Keys that
/// themselves contain dots are not supported.
#[must_use]
pub fn json_query<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// String form of the value at `path`: strings unquoted, other scalars via
/// their JSON text.
///
/// # Errors
///
/// Returns [`ContextError::MissingJsonPath`] when nothing is at `path`.
pub fn json_query_str(value: &Value, path: &str) -> Result<String, ContextError> {
    match json_query(value, path) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(ContextError::MissingJsonPath(path.to_string())),
        Some(other) => Ok(other.to_string()),
    }
}

/// `gcloud compute instances get-serial-port-output` for one VM.
#[must_use]
pub fn serial_port_command(project_id: &str, vm_name: &str, zone: &str, port: u8) -> Command {
    Command::gcloud([
        "compute",
        "instances",
        "get-serial-port-output",
        vm_name,
    ])
    .arg(format!("--project={project_id}"))
    .arg(format!("--zone={zone}"))
    .arg(format!("--port={port}"))
}

/// `gcloud projects describe` returning only the project number.
#[must_use]
pub fn project_number_command(project_id: &str) -> Command {
    Command::gcloud(["projects", "describe", project_id, "--format=value(projectNumber)"])
}
