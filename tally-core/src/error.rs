//! Structured calculation errors
//!
//! Errors never crash the session. A failed calculation is a value carrying a
//! machine-readable kind, a human-readable message and, where useful, a hint.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const EMPTY_INPUT: &str = "EMPTY_INPUT";
    pub const INSUFFICIENT_SAMPLE: &str = "INSUFFICIENT_SAMPLE";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const OVERFLOW: &str = "OVERFLOW";
    pub const ISOLATION_FAILURE: &str = "ISOLATION_FAILURE";
    pub const TIMEOUT: &str = "TIMEOUT";
}

/// Failure category of a single calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An operand token is not a decimal literal
    InvalidNumericInput,
    /// No command is registered under the requested name
    UnknownOperation,
    /// Divisor is zero
    DivisionByZero,
    /// Statistical command received no operands
    EmptyInput,
    /// Statistical command received fewer operands than it needs
    InsufficientSample,
    /// Fixed-arity command received the wrong number of operands
    ArityMismatch,
    /// Intermediate result left the representable range
    Overflow,
    /// The isolated worker faulted or went away without reporting
    IsolatedExecutionFailure,
    /// The isolated worker did not report within the time box
    Timeout,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidNumericInput => codes::INVALID_NUMBER,
            ErrorKind::UnknownOperation => codes::UNKNOWN_OPERATION,
            ErrorKind::DivisionByZero => codes::DIV_ZERO,
            ErrorKind::EmptyInput => codes::EMPTY_INPUT,
            ErrorKind::InsufficientSample => codes::INSUFFICIENT_SAMPLE,
            ErrorKind::ArityMismatch => codes::ARG_COUNT,
            ErrorKind::Overflow => codes::OVERFLOW,
            ErrorKind::IsolatedExecutionFailure => codes::ISOLATION_FAILURE,
            ErrorKind::Timeout => codes::TIMEOUT,
        }
    }
}

/// Structured calculation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcError {
    /// Failure category
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CalcError {
    /// Create a new error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Machine-readable code of this error's kind
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    // ========== Common Error Constructors ==========

    /// One or more operand tokens failed to parse. Every offending token is listed.
    pub fn invalid_number<S: AsRef<str>>(tokens: &[S]) -> Self {
        let listed: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        Self::new(
            ErrorKind::InvalidNumericInput,
            format!("Invalid number: {}", listed.join(", ")),
        )
        .with_suggestion("Operands must be decimal literals such as 42, -3.5 or 1e3")
    }

    pub fn unknown_operation(name: &str) -> Self {
        Self::new(ErrorKind::UnknownOperation, format!("Unknown operation: {}", name))
            .with_suggestion("Type 'menu' to list available operations")
    }

    pub fn div_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero")
            .with_suggestion("Ensure divisor is not zero")
    }

    pub fn empty_input(op: &str) -> Self {
        Self::new(ErrorKind::EmptyInput, format!("{} requires at least one value", op))
    }

    pub fn insufficient_sample(op: &str, min: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientSample,
            format!("{} requires at least {} values, got {}", op, min, got),
        )
    }

    pub fn arity(op: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("{} expects {} operands, got {}", op, expected, got),
        )
        .with_suggestion(format!("Use: {} <num1> <num2>", op))
    }

    pub fn overflow(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overflow, format!("Numeric overflow: {}", details.into()))
    }

    pub fn isolation(details: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::IsolatedExecutionFailure,
            format!("Isolated execution failed: {}", details.into()),
        )
    }

    pub fn timeout(op: &str, millis: u128) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("{} did not finish within {} ms", op, millis),
        )
        .with_suggestion("Raise TALLY_TIMEOUT_MS or set it to 0 to wait indefinitely")
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for CalcError {}

impl From<NumberError> for CalcError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::invalid_number(&[s]),
            NumberError::OutOfRange(s) => Self::invalid_number(&[s]),
            NumberError::DivisionByZero => Self::div_zero(),
            NumberError::Overflow => Self::overflow("result too large"),
        }
    }
}
