//! Plugin Discovery
//!
//! A plugin directory holds JSON descriptor files. Each descriptor lists the
//! commands it contributes as `name` → `entry` pairs, where `entry` names a
//! factory constructor in a [`PluginCatalog`]:
//!
//! ```json
//! {
//!   "plugin": "arithmetic",
//!   "commands": [
//!     { "name": "add", "entry": "arithmetic.add" },
//!     { "name": "plus", "entry": "arithmetic.add" }
//!   ]
//! }
//! ```
//!
//! Files are visited in directory-listing order. When two descriptors register
//! the same name, the one loaded last wins.

use crate::{CommandFactory, CommandRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Constructor for a catalogued factory
pub type FactoryConstructor = fn() -> Arc<dyn CommandFactory>;

/// Contents of one descriptor file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub plugin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub commands: Vec<CommandEntry>,
}

/// A command a descriptor contributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEntry {
    pub name: String,
    pub entry: String,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read plugin directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read plugin descriptor {}: {source}", .path.display())]
    ReadDescriptor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid plugin descriptor {}: {source}", .path.display())]
    InvalidDescriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Entry-point id → factory constructor
#[derive(Default)]
pub struct PluginCatalog {
    entries: HashMap<String, FactoryConstructor>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, id: impl Into<String>, constructor: FactoryConstructor) -> Self {
        self.entries.insert(id.into(), constructor);
        self
    }

    pub fn resolve(&self, id: &str) -> Option<Arc<dyn CommandFactory>> {
        self.entries.get(id).map(|constructor| constructor())
    }

    /// Known entry-point ids, sorted
    pub fn entry_points(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

/// Something discovery passed over, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// What a discovery pass did
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Descriptor files loaded, in visit order
    pub descriptors: Vec<PathBuf>,
    /// Command names registered, in registration order
    pub registered: Vec<String>,
    /// Files and entries that were skipped
    pub skipped: Vec<Skipped>,
}

/// Parse a single descriptor file
pub fn load_descriptor(path: &Path) -> Result<PluginDescriptor, DiscoveryError> {
    let text = fs::read_to_string(path).map_err(|source| DiscoveryError::ReadDescriptor {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DiscoveryError::InvalidDescriptor {
        path: path.to_path_buf(),
        source,
    })
}

/// Descriptor files are `*.json`; names starting with `_` or `.` are manifests
/// or hidden files and are ignored.
fn is_descriptor(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && !file_name.starts_with('_')
        && !file_name.starts_with('.')
        && path.extension().map_or(false, |e| e == "json")
}

/// Scan `dir` and register every command its descriptors name.
///
/// Broken descriptors and unknown entry points are skipped and reported; only
/// an unreadable directory fails the whole pass.
pub fn discover(
    dir: &Path,
    catalog: &PluginCatalog,
    registry: &mut CommandRegistry,
) -> Result<DiscoveryReport, DiscoveryError> {
    info!(dir = %dir.display(), "loading plugins");

    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut report = DiscoveryReport::default();

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(source) => {
                return Err(DiscoveryError::ReadDir { path: dir.to_path_buf(), source });
            }
        };
        if !is_descriptor(&path) {
            continue;
        }

        debug!(path = %path.display(), "importing plugin descriptor");
        let descriptor = match load_descriptor(&path) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "skipping plugin descriptor");
                report.skipped.push(Skipped { path, reason: e.to_string() });
                continue;
            }
        };

        for command in &descriptor.commands {
            if command.name.trim().is_empty() {
                warn!(plugin = %descriptor.plugin, entry = %command.entry, "skipping command with empty name");
                report.skipped.push(Skipped {
                    path: path.clone(),
                    reason: format!("empty command name for entry '{}'", command.entry),
                });
                continue;
            }
            match catalog.resolve(&command.entry) {
                Some(factory) => {
                    registry.register(command.name.clone(), factory);
                    report.registered.push(command.name.clone());
                }
                None => {
                    warn!(
                        plugin = %descriptor.plugin,
                        command = %command.name,
                        entry = %command.entry,
                        "unknown entry point"
                    );
                    report.skipped.push(Skipped {
                        path: path.clone(),
                        reason: format!(
                            "unknown entry point '{}' for command '{}'",
                            command.entry, command.name
                        ),
                    });
                }
            }
        }

        report.descriptors.push(path);
    }

    info!(
        descriptors = report.descriptors.len(),
        commands = report.registered.len(),
        skipped = report.skipped.len(),
        "plugins loaded"
    );
    Ok(report)
}
