//! Command Registry

use crate::{CommandFactory, CommandMeta};
use std::collections::HashMap;
use std::sync::Arc;
use tally_core::CalcError;
use tracing::debug;

/// Name → factory lookup table.
///
/// Names are case-sensitive. Registering a name twice replaces the earlier
/// factory. Build the registry up front, then share it behind an `Arc`.
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn CommandFactory>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Builder: register a factory under its own metadata name
    pub fn with_command<F: CommandFactory + 'static>(mut self, factory: F) -> Self {
        let name = factory.meta().name.to_string();
        self.register(name, Arc::new(factory));
        self
    }

    /// Register `factory` under `name`, replacing any earlier entry
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn CommandFactory>) {
        let name = name.into();
        let implementation = factory.meta().name;
        if self.commands.insert(name.clone(), factory).is_some() {
            debug!(command = %name, implementation, "replaced existing registration");
        } else {
            debug!(command = %name, implementation, "registered command");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.commands.get(name).map(|f| f.as_ref())
    }

    /// Look up a factory, failing with `UnknownOperation` on a miss
    pub fn lookup(&self, name: &str) -> Result<&dyn CommandFactory, CalcError> {
        match self.get(name) {
            Some(factory) => Ok(factory),
            None => {
                let similar = self.find_similar(name);
                let mut err = CalcError::unknown_operation(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Did you mean: {}? Type 'menu' for the full list.",
                        suggestions.join(", ")
                    ));
                }
                Err(err)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered names with their factory metadata, sorted by name
    pub fn list(&self) -> Vec<(String, CommandMeta)> {
        let mut entries: Vec<(String, CommandMeta)> = self
            .commands
            .iter()
            .map(|(name, factory)| (name.clone(), factory.meta()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Find registered names similar to the given name (for error suggestions)
    fn find_similar(&self, name: &str) -> Vec<String> {
        let query = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .commands
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&query, &candidate.to_lowercase());
                if score > 0 {
                    Some((candidate.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical for stable output
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        if query.is_empty() {
            return 0;
        }

        let mut score = 0;
        if candidate == query {
            // Case-only difference
            score += 200;
        } else if candidate.starts_with(query) || query.starts_with(candidate) {
            score += 100;
        } else if candidate.contains(query) || query.contains(candidate) {
            score += 50;
        }

        let query_chars: std::collections::HashSet<char> = query.chars().collect();
        let candidate_chars: std::collections::HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Require most of the query's characters before counting overlap alone
        if score == 0 && common * 2 < query_chars.len().max(candidate_chars.len()) {
            return 0;
        }
        score + common * 2
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arity, Command};
    use tally_core::{ErrorKind, Number, Outcome};

    struct Constant {
        name: &'static str,
        value: i64,
    }

    struct ConstantCommand(i64);

    impl Command for ConstantCommand {
        fn name(&self) -> &str {
            "constant"
        }

        fn execute(&self) -> Outcome {
            Ok(Number::from_i64(self.0))
        }
    }

    impl CommandFactory for Constant {
        fn meta(&self) -> CommandMeta {
            CommandMeta {
                name: self.name,
                description: "Returns a fixed value",
                usage: "constant",
                arity: Arity::Variadic,
                category: "test",
                examples: &[],
            }
        }

        fn create(&self, _operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
            Ok(Box::new(ConstantCommand(self.value)))
        }
    }

    fn run(registry: &CommandRegistry, name: &str) -> Outcome {
        registry.lookup(name)?.create(vec![])?.execute()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = CommandRegistry::new().with_command(Constant { name: "one", value: 1 });
        assert!(registry.contains("one"));
        assert_eq!(run(&registry, "one").unwrap().to_i64(), Some(1));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = CommandRegistry::new();
        registry.register("add", Arc::new(Constant { name: "first", value: 1 }));
        registry.register("add", Arc::new(Constant { name: "second", value: 2 }));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("add").unwrap().meta().name, "second");
        assert_eq!(run(&registry, "add").unwrap().to_i64(), Some(2));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = CommandRegistry::new().with_command(Constant { name: "mean", value: 0 });
        let err = registry.lookup("Mean").err().unwrap();
        assert_eq!(err.kind, ErrorKind::UnknownOperation);
        assert!(err.suggestion.unwrap().contains("mean"));
    }

    #[test]
    fn test_lookup_miss_without_similar_names() {
        let registry = CommandRegistry::new().with_command(Constant { name: "add", value: 0 });
        let err = registry.lookup("zzzz").err().unwrap();
        assert_eq!(err.kind, ErrorKind::UnknownOperation);
        assert!(err.message.contains("zzzz"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = CommandRegistry::new()
            .with_command(Constant { name: "subtract", value: 0 })
            .with_command(Constant { name: "add", value: 0 })
            .with_command(Constant { name: "mode", value: 0 });
        assert_eq!(registry.names(), vec!["add", "mode", "subtract"]);
        let listed: Vec<String> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(listed, registry.names());
    }

    #[test]
    fn test_alias_keeps_implementation_meta() {
        let mut registry = CommandRegistry::new();
        registry.register("plus", Arc::new(Constant { name: "add", value: 3 }));
        assert!(registry.contains("plus"));
        assert!(!registry.contains("add"));
        assert_eq!(registry.list()[0].1.name, "add");
    }
}
