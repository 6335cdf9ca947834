//! Dispatch: operation name + raw operand text → isolated outcome

use std::sync::Arc;
use tally_core::{CalcError, Number, Outcome};
use tally_plugin::{Arity, CommandRegistry, Isolation};
use tracing::debug;

/// Parse every operand, reporting all bad tokens at once
pub fn parse_operands<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Number>, CalcError> {
    let mut numbers = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();

    for token in raw {
        match token.as_ref().parse::<Number>() {
            Ok(n) => numbers.push(n),
            Err(_) => invalid.push(token.as_ref()),
        }
    }

    if invalid.is_empty() {
        Ok(numbers)
    } else {
        Err(CalcError::invalid_number(&invalid))
    }
}

/// Routes a request to its command and runs it isolated
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    isolation: Isolation,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            isolation: Isolation::default(),
        }
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Run `operation` over `raw_operands`.
    ///
    /// Operands are parsed before the lookup, so a request with bad numbers
    /// never reaches a command. The registry is only read.
    pub async fn dispatch<S: AsRef<str>>(&self, operation: &str, raw_operands: &[S]) -> Outcome {
        let operands = parse_operands(raw_operands)?;
        let factory = self.registry.lookup(operation)?;

        if let Arity::Fixed(expected) = factory.meta().arity {
            if operands.len() != expected {
                return Err(CalcError::arity(operation, expected, operands.len()));
            }
        }

        debug!(operation, operands = operands.len(), "dispatching");
        let command = factory.create(operands)?;
        let outcome = self.isolation.run(command).await;

        match &outcome {
            Ok(value) => debug!(operation, result = %value, "command finished"),
            Err(e) => debug!(operation, code = e.code(), "command failed"),
        }
        outcome
    }
}
