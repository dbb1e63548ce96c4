use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::variable::{LIST_VARIABLE, MAX_LIST_VALUE_LEN, Scope};

/// User settings from EnvSweep Settings.yaml
///
/// Everything here has a sensible default so the tool runs without any
/// configuration file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSettings {
    #[serde(rename = "EnvSweep_Settings")]
    pub sweep_settings: SweepOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOptions {
    /// Always run in preview mode, even without the --what-if flag
    #[serde(rename = "What If Mode", default)]
    pub what_if_mode: bool,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Backup Dir", default = "default_backup_dir")]
    pub backup_dir: String,

    /// Variable names that are never cleaned or removed (case-insensitive)
    #[serde(rename = "Protected Variables", default = "default_protected_variables")]
    pub protected_variables: Vec<String>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            what_if_mode: false,
            debug_mode: false,
            backup_dir: default_backup_dir(),
            protected_variables: default_protected_variables(),
        }
    }
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            sweep_settings: SweepOptions::default(),
        }
    }
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

/// Variables whose values are semicolon lists of non-paths (PATHEXT) or plain
/// flags the OS depends on. Cleaning would mangle or remove them.
fn default_protected_variables() -> Vec<String> {
    [
        "PATHEXT",
        "OS",
        "ComSpec",
        "windir",
        "PSModulePath",
        "PROCESSOR_ARCHITECTURE",
        "PROCESSOR_IDENTIFIER",
        "NUMBER_OF_PROCESSORS",
        "TEMP",
        "TMP",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Explicit run configuration threaded into every component.
///
/// Nothing in the processing pipeline reads ambient global state; scope list,
/// size limit and preview flag all arrive through this value.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scopes: Vec<Scope>,
    pub max_list_length: usize,
    /// Name of the variable subject to the size guard, compared case-insensitively
    pub list_variable: String,
    pub preview: bool,
    pub protected: Vec<String>,
    pub backup_dir: Utf8PathBuf,
}

impl RunConfig {
    /// Build the run configuration from loaded settings plus CLI overrides.
    pub fn from_settings(
        settings: &SweepSettings,
        what_if: bool,
        backup_dir: Option<Utf8PathBuf>,
    ) -> Self {
        let options = &settings.sweep_settings;
        Self {
            scopes: vec![Scope::User, Scope::System],
            max_list_length: MAX_LIST_VALUE_LEN,
            list_variable: LIST_VARIABLE.to_string(),
            preview: what_if || options.what_if_mode,
            protected: options.protected_variables.clone(),
            backup_dir: backup_dir.unwrap_or_else(|| Utf8PathBuf::from(&options.backup_dir)),
        }
    }

    /// Check whether a variable name is exempt from cleaning.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Check whether a name refers to the designated list variable.
    pub fn is_list_variable(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.list_variable)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_settings(&SweepSettings::default(), false, None)
    }
}
