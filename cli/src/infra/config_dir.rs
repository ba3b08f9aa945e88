//! Scratch directory of YAML instance configs consumed by a Terraform module
//! through its `config_folder_path` variable.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;

/// A directory the harness writes `*.yaml` documents into.
#[derive(Debug, Clone)]
pub struct ConfigDir {
    path: PathBuf,
}

impl ConfigDir {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the document `name` (without extension).
    #[must_use]
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.yaml"))
    }

    /// Serialize `doc` to `<dir>/<name>.yaml`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn write_document<T: Serialize>(&self, name: &str, doc: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("unable to create config directory {}", self.path.display()))?;
        let yaml = serde_yaml::to_string(doc).context("error marshalling YAML")?;
        let file = self.document_path(name);
        std::fs::write(&file, yaml)
            .with_context(|| format!("unable to write data to file {}", file.display()))?;
        tracing::info!(path = %file.display(), "config document written");
        Ok(file)
    }

    /// Remove one document. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, name: &str) -> Result<()> {
        let file = self.document_path(name);
        match std::fs::remove_file(&file) {
            Ok(()) => {
                tracing::info!(path = %file.display(), "config document removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot remove {}", file.display())),
        }
    }

    /// Delete every `*.yaml` left over from earlier runs. Individual removal
    /// failures are logged and skipped; returns how many files were removed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory exists but cannot be listed.
    pub fn remove_stale(&self) -> Result<usize> {
        tracing::info!(path = %self.path.display(), "cleaning up config directory");
        let entries = match std::fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot list {}", self.path.display()));
            }
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let file = entry.path();
            if file.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match std::fs::remove_file(&file) {
                Ok(()) => {
                    tracing::info!(path = %file.display(), "removed stale config file");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "could not remove stale config file");
                }
            }
        }
        Ok(removed)
    }
}

/// Write a VM startup script to a temporary file for
/// `--metadata-from-file startup-script=<path>`. The file is deleted when the
/// returned handle drops.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
pub fn write_startup_script(script: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("startup-script-")
        .suffix(".sh")
        .tempfile()
        .context("failed to create temp file for startup script")?;
    file.write_all(script.as_bytes())
        .context("failed to write startup script")?;
    file.flush().context("failed to flush startup script")?;
    Ok(file)
}
