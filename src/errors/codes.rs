use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes for programmatic handling of query failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Lookup used an operator suffix that is not in the operator table
    UnknownOperator,

    /// Record has no attribute with the requested name
    MissingField,

    /// Operands cannot be compared or combined
    TypeMismatch,

    /// Derived accessor divided by zero
    DivisionByZero,

    /// Integer arithmetic left the representable range
    ArithmeticOverflow,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOperator => write!(f, "UNKNOWN_OPERATOR"),
            Self::MissingField => write!(f, "MISSING_FIELD"),
            Self::TypeMismatch => write!(f, "TYPE_MISMATCH"),
            Self::DivisionByZero => write!(f, "DIVISION_BY_ZERO"),
            Self::ArithmeticOverflow => write!(f, "ARITHMETIC_OVERFLOW"),
        }
    }
}
