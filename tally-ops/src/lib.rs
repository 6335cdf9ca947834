//! Tally Operations
//!
//! The built-in command set: binary arithmetic and statistics over decimal
//! operands. Commands reach a registry either through the static bootstrap
//! list (`standard_registry`) or through plugin descriptors resolved against
//! `builtin_catalog`.

pub mod primitives;
pub mod arithmetic;
pub mod statistics;

use std::sync::Arc;
use tally_plugin::{CommandFactory, CommandRegistry, PluginCatalog};

/// Load arithmetic commands into registry
pub fn load_arithmetic(registry: CommandRegistry) -> CommandRegistry {
    registry
        .with_command(arithmetic::Add)
        .with_command(arithmetic::Subtract)
        .with_command(arithmetic::Multiply)
        .with_command(arithmetic::Divide)
}

/// Load statistics commands into registry
pub fn load_statistics(registry: CommandRegistry) -> CommandRegistry {
    registry
        .with_command(statistics::Mean)
        .with_command(statistics::Mode)
        .with_command(statistics::StdDev)
}

/// Create registry with every built-in command
pub fn standard_registry() -> CommandRegistry {
    load_statistics(load_arithmetic(CommandRegistry::new()))
}

/// Entry points plugin descriptors may name
pub fn builtin_catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with_entry("arithmetic.add", || Arc::new(arithmetic::Add) as Arc<dyn CommandFactory>)
        .with_entry("arithmetic.subtract", || Arc::new(arithmetic::Subtract) as Arc<dyn CommandFactory>)
        .with_entry("arithmetic.multiply", || Arc::new(arithmetic::Multiply) as Arc<dyn CommandFactory>)
        .with_entry("arithmetic.divide", || Arc::new(arithmetic::Divide) as Arc<dyn CommandFactory>)
        .with_entry("stats.mean", || Arc::new(statistics::Mean) as Arc<dyn CommandFactory>)
        .with_entry("stats.mode", || Arc::new(statistics::Mode) as Arc<dyn CommandFactory>)
        .with_entry("stats.stddev", || Arc::new(statistics::StdDev) as Arc<dyn CommandFactory>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tally_plugin::discover;

    const BUILTINS: [&str; 7] = ["add", "divide", "mean", "mode", "multiply", "stddev", "subtract"];

    fn shipped_plugins() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../plugins")
    }

    #[test]
    fn test_standard_registry_names() {
        assert_eq!(standard_registry().names(), BUILTINS);
    }

    #[test]
    fn test_catalog_resolves_every_entry() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.entry_points().len(), BUILTINS.len());
        for id in catalog.entry_points() {
            assert!(catalog.resolve(id).is_some(), "{}", id);
        }
    }

    #[test]
    fn test_shipped_descriptors_match_static_bootstrap() {
        let mut registry = CommandRegistry::new();
        let report = discover(&shipped_plugins(), &builtin_catalog(), &mut registry).unwrap();

        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        assert_eq!(registry.names(), standard_registry().names());
        for (name, meta) in registry.list() {
            assert_eq!(name, meta.name);
        }
    }

    #[test]
    fn test_descriptor_alias_runs_catalogued_command() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("aliases.json"),
            r#"{"plugin": "aliases", "commands": [{"name": "avg", "entry": "stats.mean"}]}"#,
        )
        .unwrap();

        let mut registry = CommandRegistry::new();
        discover(dir.path(), &builtin_catalog(), &mut registry).unwrap();

        let operands = vec![tally_core::Number::from_i64(2), tally_core::Number::from_i64(4)];
        let result = registry.lookup("avg").unwrap().create(operands).unwrap().execute();
        assert_eq!(result.unwrap().to_i64(), Some(3));
    }
}
