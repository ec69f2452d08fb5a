use thiserror::Error;

use crate::Flags;

/// Error type for numeric-tower operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// A string could not be parsed as a number.
    #[error("invalid number syntax: {0}")]
    Parse(String),
    /// An argument was out of its domain (e.g. a zero denominator).
    #[error("invalid argument: {0}")]
    Argument(String),
    /// The operation raised a condition the context traps.
    #[error("trapped arithmetic condition: {flags}")]
    Trapped { flags: Flags },
    /// The value has no representation in the requested target.
    #[error("value out of range: {0}")]
    Overflow(String),
}
