//! Statistical commands over any number of operands: mean, mode, stddev

use crate::primitives;
use tally_plugin::prelude::*;

/// Operation applied by a [`StatCommand`]
pub type StatOp = fn(&[Number]) -> Outcome;

/// A sample and the statistic to compute over it.
///
/// Accepts any operand count; the statistic itself reports `EmptyInput` or
/// `InsufficientSample`.
pub struct StatCommand {
    name: &'static str,
    values: Vec<Number>,
    op: StatOp,
}

impl StatCommand {
    pub fn new(name: &'static str, values: Vec<Number>, op: StatOp) -> Self {
        Self { name, values, op }
    }
}

impl Command for StatCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self) -> Outcome {
        (self.op)(&self.values)
    }
}

pub struct Mean;
pub struct Mode;
pub struct StdDev;

static MEAN_EXAMPLES: [&str; 2] = ["mean 10 20 30 → 20", "mean 1 2 → 1.5"];
static MODE_EXAMPLES: [&str; 2] = ["mode 1 2 2 3 → 2", "mode 3 1 1 3 → 3 (first seen wins a tie)"];
static STDDEV_EXAMPLES: [&str; 1] = ["stddev 10 20 → 7.0710678118654755"];

impl CommandFactory for Mean {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "mean",
            description: "Arithmetic mean (average) of values",
            usage: "mean <x1> <x2> ...",
            arity: Arity::Variadic,
            category: "stats/central",
            examples: &MEAN_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        Ok(Box::new(StatCommand::new("mean", operands, primitives::mean)))
    }
}

impl CommandFactory for Mode {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "mode",
            description: "Most frequent value. Ties go to the value seen first",
            usage: "mode <x1> <x2> ...",
            arity: Arity::Variadic,
            category: "stats/central",
            examples: &MODE_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        Ok(Box::new(StatCommand::new("mode", operands, primitives::mode)))
    }
}

impl CommandFactory for StdDev {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "stddev",
            description: "Sample standard deviation (n - 1 divisor), at least two values",
            usage: "stddev <x1> <x2> ...",
            arity: Arity::Variadic,
            category: "stats/dispersion",
            examples: &STDDEV_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        Ok(Box::new(StatCommand::new("stddev", operands, primitives::stddev)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operands(values: &[i64]) -> Vec<Number> {
        values.iter().map(|v| Number::from_i64(*v)).collect()
    }

    #[test]
    fn test_mean_command() {
        let cmd = Mean.create(operands(&[10, 20, 30])).unwrap();
        assert_eq!(cmd.name(), "mean");
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(20));
    }

    #[test]
    fn test_mean_command_accepts_no_operands() {
        let cmd = Mean.create(vec![]).unwrap();
        assert_eq!(cmd.execute().unwrap_err().kind, ErrorKind::EmptyInput);
    }

    #[test]
    fn test_mode_command() {
        let cmd = Mode.create(operands(&[4, 1, 4])).unwrap();
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(4));
    }

    #[test]
    fn test_stddev_command() {
        let cmd = StdDev.create(operands(&[10])).unwrap();
        assert_eq!(cmd.execute().unwrap_err().kind, ErrorKind::InsufficientSample);

        let cmd = StdDev.create(operands(&[10, 20])).unwrap();
        assert_eq!(cmd.execute().unwrap().to_plain_string(), "7.0710678118654755");
    }

    #[test]
    fn test_statistics_are_variadic() {
        for factory in [&Mean as &dyn CommandFactory, &Mode, &StdDev] {
            assert!(factory.meta().arity.is_variadic());
        }
    }
}
