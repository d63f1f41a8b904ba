//! Error taxonomy for TypedFrame.
//!
//! Every failure is synchronous and final: the library holds data in memory
//! and has no partial-failure or retry paths. Errors are grouped by who is at
//! fault (malformed input, caller misuse, unsupported type combinations,
//! illegal in-place widening, arithmetic faults on the data itself).

use crate::value::ElementType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameError>;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticFault),

    #[error("{operation} is not supported between {left} and {right}")]
    NotSupported {
        operation: String,
        left: ElementType,
        right: ElementType,
    },

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("index {index} out of range [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot parse '{text}' as {expected} (line {line}, column '{column}')")]
    Parse {
        text: String,
        expected: ElementType,
        line: usize,
        column: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FrameError {
    pub(crate) fn not_supported(
        operation: impl Into<String>,
        left: ElementType,
        right: ElementType,
    ) -> Self {
        FrameError::NotSupported {
            operation: operation.into(),
            left,
            right,
        }
    }
}

/// Malformed or insufficient tabular input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("input contains no rows")]
    EmptyFile,

    #[error("line {line} has {actual} fields, expected {expected}")]
    LessColumnsThanExpected {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line} has {actual} fields, expected {expected}")]
    MoreColumnsThanExpected {
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// Caller misuse of an API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("mismatched column lengths: expected {expected}, got {actual}")]
    MismatchedColumnLengths { expected: usize, actual: usize },

    #[error("decimal separator '{0}' must differ from the column separator")]
    SeparatorCollision(char),

    #[error("expected {expected} values, got {actual}")]
    MismatchedValueCount { expected: usize, actual: usize },

    #[error("{0}")]
    Invalid(String),
}

/// An in-place operation or append that would need a different element type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeMismatch {
    #[error("in-place {operation} on a {target} column would produce {result}")]
    MismatchedColumnValueType {
        operation: String,
        target: ElementType,
        result: ElementType,
    },

    #[error("value of type {actual} cannot be stored in a {expected} column")]
    MismatchedValueType {
        expected: ElementType,
        actual: ElementType,
    },
}

/// A fault raised by the data while computing an elementwise result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticFault {
    #[error("{0} division by zero")]
    DivideByZero(ElementType),

    #[error("{0} arithmetic overflow")]
    Overflow(ElementType),

    #[error("value cannot be represented as {0}")]
    Unrepresentable(ElementType),
}
