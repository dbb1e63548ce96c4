use crate::backup::BackupWriter;
use crate::models::{RunConfig, Scope};
use crate::platform::{EnvironmentBroadcaster, PrivilegeChecker};
use crate::services::cleaning::CleanerService;
use crate::services::compare::common_names;
use crate::services::processing::{ScopeOutcome, VariableProcessor};
use crate::store::StoreAccessor;

/// Everything a run produced, for reporting and the exit code.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ScopeOutcome>,
    pub common_names: Vec<String>,
    pub scope_failures: usize,
    pub backup_failures: usize,
}

impl RunReport {
    /// A production run should exit non-zero when this is true.
    pub fn had_failures(&self) -> bool {
        self.scope_failures > 0 || self.backup_failures > 0
    }
}

/// Drives one complete maintenance run.
///
/// Sequence: backup both scopes, process User, gate System on elevation,
/// process System, report common variable names, broadcast the change.
/// Strictly sequential; every failure is contained at the smallest unit
/// (variable, then scope) and the run always reaches the completion step.
pub struct SweepRunner<'a> {
    config: RunConfig,
    store: &'a mut dyn StoreAccessor,
    cleaner: CleanerService,
    privilege: Box<dyn PrivilegeChecker>,
    broadcaster: Box<dyn EnvironmentBroadcaster>,
    backup: BackupWriter,
}

impl<'a> SweepRunner<'a> {
    pub fn new(
        config: RunConfig,
        store: &'a mut dyn StoreAccessor,
        cleaner: CleanerService,
        privilege: Box<dyn PrivilegeChecker>,
        broadcaster: Box<dyn EnvironmentBroadcaster>,
    ) -> Self {
        let backup = BackupWriter::new(&config.backup_dir);
        Self {
            config,
            store,
            cleaner,
            privilege,
            broadcaster,
            backup,
        }
    }

    pub fn run(&mut self) -> RunReport {
        let mut report = RunReport::default();

        // Snapshots are taken for every scope before any mutation happens.
        for scope in &self.config.scopes {
            match self.store.snapshot(*scope) {
                Ok(snapshot) => {
                    if let Err(err) = self.backup.write_backup(*scope, &snapshot) {
                        tracing::warn!("Backup of {} scope failed: {:#}", scope, err);
                        report.backup_failures += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!("Cannot snapshot {} scope for backup: {}", scope, err);
                    report.backup_failures += 1;
                }
            }
        }

        let elevated = self.privilege.is_elevated();
        let processor = VariableProcessor::new(&self.cleaner, &self.config);

        for scope in &self.config.scopes {
            if *scope == Scope::System && !elevated {
                tracing::warn!(
                    "Skipping System scope: administrator privileges are required to modify it"
                );
                continue;
            }

            match processor.process_scope(&mut *self.store, *scope) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(err) => {
                    tracing::warn!("Processing of {} scope aborted: {}", scope, err);
                    report.scope_failures += 1;
                }
            }
        }

        // Informational only; tolerate read failures on either side.
        let user_names = self
            .store
            .list_variable_names(Scope::User)
            .unwrap_or_default();
        let system_names = self
            .store
            .list_variable_names(Scope::System)
            .unwrap_or_default();
        report.common_names = common_names(&user_names, &system_names);
        tracing::info!(
            "Variables present in both scopes ({}): {}",
            report.common_names.len(),
            report.common_names.join(", ")
        );

        if self.config.preview {
            tracing::info!("What-if mode: would broadcast environment change notification");
        } else if let Err(err) = self.broadcaster.notify() {
            tracing::warn!("{}", err);
        } else {
            tracing::debug!("Environment change broadcast sent");
        }

        report
    }
}
