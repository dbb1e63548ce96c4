//! EnvSweep - audit and clean Windows User/System environment variables
//!
//! One-shot maintenance run:
//! 1. Load settings from `EnvSweep Data/EnvSweep Settings.yaml` (defaults if absent)
//! 2. Initialize logging → logs/envsweep.<date>
//! 3. Back up both scopes to YAML snapshots
//! 4. Clean User scope, then System scope (System only when elevated)
//! 5. Report variable names common to both scopes
//! 6. Broadcast `WM_SETTINGCHANGE` so running shells pick up the new values
//!
//! With `--what-if` the full report is produced but nothing is written back.

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use envsweep::app::SweepRunner;
use envsweep::platform::{ProcessElevation, SettingChangeBroadcast};
use envsweep::services::CleanerService;
use envsweep::store::RegistryStore;
use envsweep::{APP_NAME, ConfigManager, RunConfig, VERSION};

#[derive(Parser, Debug)]
#[command(name = "envsweep", version, about = "Audit and clean Windows User/System environment variables")]
struct Cli {
    /// Report what would change without writing anything back
    #[arg(long = "what-if")]
    what_if: bool,

    /// Verbose diagnostic logging
    #[arg(long)]
    debug: bool,

    /// Directory for pre-run backup snapshots (overrides settings)
    #[arg(long)]
    backup_dir: Option<Utf8PathBuf>,

    /// Directory holding EnvSweep Settings.yaml
    #[arg(long, default_value = "EnvSweep Data")]
    config_dir: Utf8PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Settings are read before logging so the file's debug flag can pick the
    // log level; the settings-source line is reported once the subscriber is up.
    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let (settings, settings_source) = config_manager.load_settings()?;

    let _guard = envsweep::logging::setup_logging(
        "logs",
        cli.debug || settings.sweep_settings.debug_mode,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    settings_source.report();

    let config = RunConfig::from_settings(&settings, cli.what_if, cli.backup_dir);
    if config.preview {
        tracing::info!("What-if mode enabled: no changes will be written");
    }

    let mut store = RegistryStore::new();
    let cleaner = CleanerService::new();
    let mut runner = SweepRunner::new(
        config,
        &mut store,
        cleaner,
        Box::new(ProcessElevation),
        Box::new(SettingChangeBroadcast),
    );

    let report = runner.run();

    tracing::info!("Run complete");

    if report.had_failures() {
        anyhow::bail!(
            "completed with failures ({} scope, {} backup)",
            report.scope_failures,
            report.backup_failures
        );
    }
    Ok(())
}
