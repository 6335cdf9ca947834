//! Tally Plugin System
//!
//! Provides the pieces every calculator command plugs into:
//! - `Command` / `CommandFactory` traits with arity metadata
//! - `CommandRegistry`, the name → factory lookup table
//! - Descriptor-driven discovery that fills a registry from a directory
//! - Isolated execution on a worker thread with a one-shot result channel

mod traits;
mod registry;
mod isolation;
pub mod discovery;

pub use traits::{Arity, Command, CommandFactory, CommandMeta};
pub use registry::CommandRegistry;
pub use isolation::{execute_isolated, Isolation, DEFAULT_TIMEOUT};
pub use discovery::{discover, DiscoveryError, DiscoveryReport, PluginCatalog};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{Arity, Command, CommandFactory, CommandMeta, CommandRegistry};
    pub use tally_core::prelude::*;
}
