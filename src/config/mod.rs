use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

use crate::models::SweepSettings;

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Parsed from the settings file at this path.
    File(Utf8PathBuf),
    /// No file at this path; built-in defaults in effect.
    Defaults(Utf8PathBuf),
}

impl SettingsSource {
    /// Emit the settings-source report line. Called once logging is installed.
    pub fn report(&self) {
        match self {
            SettingsSource::File(path) => tracing::info!("Loaded settings from {}", path),
            SettingsSource::Defaults(path) => {
                tracing::warn!("Settings file not found at {}, using defaults", path);
            }
        }
    }
}

/// Configuration manager for loading and saving the settings YAML file.
///
/// Manages a single file, `EnvSweep Settings.yaml`, holding user preferences
/// (preview default, backup directory, protected variable names). Every field
/// has a default, so a missing file is not an error.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("EnvSweep Settings.yaml"),
            config_dir,
        })
    }

    /// Load the settings file, falling back to defaults when it is absent.
    ///
    /// Emits no log lines itself; settings are loaded before the subscriber
    /// is installed, so the caller reports the returned [`SettingsSource`]
    /// once logging is up.
    pub fn load_settings(&self) -> Result<(SweepSettings, SettingsSource)> {
        if !self.settings_path.exists() {
            return Ok((
                SweepSettings::default(),
                SettingsSource::Defaults(self.settings_path.clone()),
            ));
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: SweepSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        Ok((settings, SettingsSource::File(self.settings_path.clone())))
    }

    /// Save the settings file.
    pub fn save_settings(&self, settings: &SweepSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let (settings, source) = manager.load_settings().unwrap();
        assert!(!settings.sweep_settings.what_if_mode);
        assert_eq!(settings.sweep_settings.backup_dir, "backups");
        assert!(matches!(source, SettingsSource::Defaults(_)));
    }

    #[test]
    fn test_save_and_reload_settings() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut settings = SweepSettings::default();
        settings.sweep_settings.what_if_mode = true;
        settings.sweep_settings.backup_dir = "D:/snapshots".to_string();
        manager.save_settings(&settings).unwrap();

        let (loaded, source) = manager.load_settings().unwrap();
        assert!(loaded.sweep_settings.what_if_mode);
        assert_eq!(loaded.sweep_settings.backup_dir, "D:/snapshots");
        assert!(matches!(source, SettingsSource::File(_)));
    }

    #[test]
    fn test_partial_settings_file_uses_field_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(
            manager.config_dir().join("EnvSweep Settings.yaml"),
            "EnvSweep_Settings:\n  Debug Mode: true\n",
        )
        .unwrap();

        let (loaded, _source) = manager.load_settings().unwrap();
        assert!(loaded.sweep_settings.debug_mode);
        // Unspecified fields keep their defaults.
        assert!(
            loaded
                .sweep_settings
                .protected_variables
                .contains(&"PATHEXT".to_string())
        );
    }

    #[test]
    fn test_settings_source_line_is_observable() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone, Default)]
        struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

        impl Write for CaptureWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for CaptureWriter {
            type Writer = CaptureWriter;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let (manager, _temp_dir) = create_test_config_manager();
        let (_settings, source) = manager.load_settings().unwrap();

        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || source.report());

        let output = String::from_utf8_lossy(&writer.0.lock().unwrap()).into_owned();
        assert!(output.contains("using defaults"));
    }
}
