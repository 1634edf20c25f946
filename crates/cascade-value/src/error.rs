//! Errors raised by value operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("incompatible units: `{lhs}` and `{rhs}`")]
    IncompatibleUnits { lhs: String, rhs: String },

    #[error("`{lhs} * {rhs}` would produce an invalid squared unit")]
    SquaredUnit { lhs: String, rhs: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{role} `{value}` must be unitless")]
    NotUnitless { role: &'static str, value: String },

    #[error("undefined operation `{lhs} {op} {rhs}`")]
    UndefinedOperation { op: &'static str, lhs: String, rhs: String },

    #[error("expected {expected}, found `{found}`")]
    Expected { expected: &'static str, found: String },

    #[error("{0}")]
    OutOfRange(String),
}

pub type ValueResult<T> = Result<T, ValueError>;
