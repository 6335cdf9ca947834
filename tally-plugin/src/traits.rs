//! Command traits

use serde::Serialize;
use tally_core::{CalcError, Number, Outcome};

/// How many operands a command takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Exactly this many operands
    Fixed(usize),
    /// Any number of operands; the command validates the count itself
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => *n == count,
            Arity::Variadic => true,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Arity::Variadic)
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Variadic => f.write_str("variadic"),
        }
    }
}

/// Metadata for a command factory
#[derive(Debug, Clone, Serialize)]
pub struct CommandMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub arity: Arity,
    pub category: &'static str,
    pub examples: &'static [&'static str],
}

/// A unit of work binding operands to an operation.
///
/// Built once per invocation, executed once, then dropped.
pub trait Command: Send {
    /// Operation name, used in logs and error messages
    fn name(&self) -> &str;

    /// Compute the result. Pure: no side effects beyond the return value.
    fn execute(&self) -> Outcome;
}

/// Produces commands from parsed operands
pub trait CommandFactory: Send + Sync {
    fn meta(&self) -> CommandMeta;

    /// Build a command. Fails with `ArityMismatch` when a fixed-arity command
    /// gets the wrong operand count.
    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError>;
}
