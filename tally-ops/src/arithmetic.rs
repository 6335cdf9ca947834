//! Binary arithmetic commands: add, subtract, multiply, divide

use crate::primitives;
use tally_plugin::prelude::*;

/// Operation applied by a [`BinaryCommand`]
pub type BinaryOp = fn(&Number, &Number) -> Outcome;

/// Two operands and the operation to apply to them
pub struct BinaryCommand {
    name: &'static str,
    lhs: Number,
    rhs: Number,
    op: BinaryOp,
}

impl BinaryCommand {
    /// Build from exactly two operands, `ArityMismatch` otherwise
    pub fn new(name: &'static str, operands: Vec<Number>, op: BinaryOp) -> Result<Self, CalcError> {
        let [lhs, rhs]: [Number; 2] = operands
            .try_into()
            .map_err(|rest: Vec<Number>| CalcError::arity(name, 2, rest.len()))?;
        Ok(Self { name, lhs, rhs, op })
    }
}

impl Command for BinaryCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self) -> Outcome {
        (self.op)(&self.lhs, &self.rhs)
    }
}

fn binary(name: &'static str, operands: Vec<Number>, op: BinaryOp) -> Result<Box<dyn Command>, CalcError> {
    Ok(Box::new(BinaryCommand::new(name, operands, op)?))
}

pub struct Add;
pub struct Subtract;
pub struct Multiply;
pub struct Divide;

static ADD_EXAMPLES: [&str; 2] = ["add 10 5 → 15", "add 0.1 0.2 → 0.3"];
static SUBTRACT_EXAMPLES: [&str; 1] = ["subtract 10 15 → -5"];
static MULTIPLY_EXAMPLES: [&str; 1] = ["multiply 2.5 4 → 10"];
static DIVIDE_EXAMPLES: [&str; 2] = ["divide 10 4 → 2.5", "divide 1 0 → DIV_ZERO"];

impl CommandFactory for Add {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "add",
            description: "Sum of two numbers",
            usage: "add <a> <b>",
            arity: Arity::Fixed(2),
            category: "arithmetic",
            examples: &ADD_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        binary("add", operands, |a, b| Ok(primitives::add(a, b)))
    }
}

impl CommandFactory for Subtract {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "subtract",
            description: "Difference a - b",
            usage: "subtract <a> <b>",
            arity: Arity::Fixed(2),
            category: "arithmetic",
            examples: &SUBTRACT_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        binary("subtract", operands, |a, b| Ok(primitives::subtract(a, b)))
    }
}

impl CommandFactory for Multiply {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "multiply",
            description: "Product of two numbers",
            usage: "multiply <a> <b>",
            arity: Arity::Fixed(2),
            category: "arithmetic",
            examples: &MULTIPLY_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        binary("multiply", operands, |a, b| Ok(primitives::multiply(a, b)))
    }
}

impl CommandFactory for Divide {
    fn meta(&self) -> CommandMeta {
        CommandMeta {
            name: "divide",
            description: "Quotient a / b in full decimal precision. Error if b is zero",
            usage: "divide <a> <b>",
            arity: Arity::Fixed(2),
            category: "arithmetic",
            examples: &DIVIDE_EXAMPLES,
        }
    }

    fn create(&self, operands: Vec<Number>) -> Result<Box<dyn Command>, CalcError> {
        binary("divide", operands, primitives::divide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operands(values: &[i64]) -> Vec<Number> {
        values.iter().map(|v| Number::from_i64(*v)).collect()
    }

    #[test]
    fn test_add_command() {
        let cmd = Add.create(operands(&[10, 5])).unwrap();
        assert_eq!(cmd.name(), "add");
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(15));
    }

    #[test]
    fn test_subtract_command() {
        let cmd = Subtract.create(operands(&[10, 5])).unwrap();
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(5));
    }

    #[test]
    fn test_multiply_command() {
        let cmd = Multiply.create(operands(&[10, 5])).unwrap();
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(50));
    }

    #[test]
    fn test_divide_command() {
        let cmd = Divide.create(operands(&[10, 5])).unwrap();
        assert_eq!(cmd.execute().unwrap().to_i64(), Some(2));

        let cmd = Divide.create(operands(&[10, 0])).unwrap();
        assert_eq!(cmd.execute().unwrap_err().kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_wrong_operand_count() {
        let err = Add.create(operands(&[1])).err().unwrap();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert!(err.message.contains("got 1"));

        let err = Divide.create(operands(&[1, 2, 3])).err().unwrap();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }
}
