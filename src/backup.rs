use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use indexmap::IndexMap;
use std::fs;

use crate::models::Scope;

/// Writes a YAML snapshot of a scope's variables before any mutation.
///
/// One file per scope per run; a failed backup is reported as a warning by
/// the caller and never blocks processing.
#[derive(Debug, Clone)]
pub struct BackupWriter {
    backup_dir: Utf8PathBuf,
}

impl BackupWriter {
    pub fn new<P: AsRef<Utf8Path>>(backup_dir: P) -> Self {
        Self {
            backup_dir: backup_dir.as_ref().to_path_buf(),
        }
    }

    /// Serialize the snapshot and return the path of the file written.
    pub fn write_backup(
        &self,
        scope: Scope,
        snapshot: &IndexMap<String, String>,
    ) -> Result<Utf8PathBuf> {
        if !self.backup_dir.exists() {
            fs::create_dir_all(&self.backup_dir).with_context(|| {
                format!("Failed to create backup directory: {}", self.backup_dir)
            })?;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let file_name = format!(
            "envsweep_backup_{}_{}.yaml",
            scope.label().to_lowercase(),
            timestamp
        );
        let path = self.backup_dir.join(file_name);

        let yaml_string = serde_yaml_ng::to_string(snapshot)
            .with_context(|| format!("Failed to serialize {} scope snapshot", scope))?;

        fs::write(&path, yaml_string)
            .with_context(|| format!("Failed to write backup file: {}", path))?;

        tracing::info!(
            "Backed up {} {} variables to {}",
            snapshot.len(),
            scope,
            path
        );
        Ok(path)
    }
}
