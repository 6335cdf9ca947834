//! Tally - calculator engine
//!
//! Ties the command registry to a dispatcher and a history ledger:
//!
//! ```text
//! registry (bootstrap or discovery) → Dispatcher → isolated command → History
//! ```

pub mod config;
pub mod dispatch;
pub mod history;

pub use config::{Config, ConfigError};
pub use dispatch::{parse_operands, Dispatcher};
pub use history::{History, HistoryError, HistoryRecord};

use std::path::Path;
use std::sync::Arc;
use tally_core::{CalcError, Outcome};
use tally_plugin::{discover, CommandRegistry, DiscoveryError, DiscoveryReport, Isolation};
use tracing::{debug, info};

/// Build a registry from the descriptors in `plugin_dir`, or from the built-in
/// list when no directory is given
pub fn load_registry(
    plugin_dir: Option<&Path>,
) -> Result<(CommandRegistry, Option<DiscoveryReport>), DiscoveryError> {
    match plugin_dir {
        Some(dir) => {
            let mut registry = CommandRegistry::new();
            let report = discover(dir, &tally_ops::builtin_catalog(), &mut registry)?;
            Ok((registry, Some(report)))
        }
        None => {
            debug!("using built-in command list");
            Ok((tally_ops::standard_registry(), None))
        }
    }
}

/// Main Tally engine
pub struct Calculator {
    dispatcher: Dispatcher,
    history: History,
}

impl Calculator {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry)),
            history: History::new(),
        }
    }

    pub fn with_standard_commands() -> Self {
        Self::new(tally_ops::standard_registry())
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.dispatcher = self.dispatcher.with_isolation(isolation);
        self
    }

    /// Build from configuration: registry source and time box
    pub fn from_config(config: &Config) -> Result<Self, DiscoveryError> {
        let (registry, report) = load_registry(config.plugin_dir.as_deref())?;
        if let Some(report) = report {
            info!(
                commands = report.registered.len(),
                skipped = report.skipped.len(),
                "registry built from plugin descriptors"
            );
        }
        Ok(Self::new(registry).with_isolation(config.isolation()))
    }

    /// Dispatch only; history is untouched
    pub async fn evaluate<S: AsRef<str>>(&self, operation: &str, operands: &[S]) -> Outcome {
        self.dispatcher.dispatch(operation, operands).await
    }

    /// Dispatch and record a success in history
    pub async fn calculate<S: AsRef<str>>(
        &mut self,
        operation: &str,
        operands: &[S],
    ) -> Result<HistoryRecord, CalcError> {
        let value = self.dispatcher.dispatch(operation, operands).await?;
        let record = HistoryRecord::new(
            operation,
            operands.iter().map(|s| s.as_ref().trim().to_string()).collect(),
            value.to_plain_string(),
        );
        self.history.push(record.clone());
        Ok(record)
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::with_standard_commands()
    }
}
