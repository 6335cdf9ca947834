//! Tally Core - Fundamental types
//!
//! This crate provides the core types used throughout Tally:
//! - `Number`: Arbitrary precision decimal numbers
//! - `CalcError`: Structured calculation errors
//! - `Outcome`: The result of running one command

mod number;
mod error;

pub use number::{Number, NumberError, DEFAULT_PRECISION, MAX_EXPONENT};
pub use error::{CalcError, ErrorKind, codes};

/// Result of executing a single command
pub type Outcome = Result<Number, CalcError>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, CalcError, ErrorKind, Outcome};
    pub use crate::error::codes;
}
