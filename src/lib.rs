// EnvSweep - Windows environment variable auditor and cleaner
//
// This is the library crate containing the cleaning logic and collaborators.
// The binary crate (main.rs) provides the CLI entry point.

pub mod app;
pub mod backup;
pub mod config;
pub mod logging;
pub mod models;
pub mod platform;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use app::{RunReport, SweepRunner};
pub use config::{ConfigManager, SettingsSource};
pub use models::{Action, RawVariable, RunConfig, Scope, SweepSettings, SweepStats};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
