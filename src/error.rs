//! Error types for vexpr evaluation.
//!
//! Only fatal conditions live here. Data-dependent outcomes (out-of-range
//! positions, malformed base64, unknown locales, packet overflow outside
//! strict mode) are resolved inside the row loop and surface as
//! [`crate::context::EvalWarning`]s instead.

use thiserror::Error;

use crate::types::EvalType;

/// Result type alias using [`VexprError`].
pub type Result<T> = std::result::Result<T, VexprError>;

/// Error types for vexpr evaluation.
#[derive(Debug, Error)]
pub enum VexprError {
    /// A value exceeded the packet budget while the session is in strict mode.
    #[error("Result of {function}() was larger than max_allowed_packet ({budget}) - truncated")]
    PacketOverflow { function: &'static str, budget: u64 },

    /// An operand produced a column of the wrong evaluation type.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeMismatch { expected: EvalType, actual: EvalType },

    /// A function was built with an unsupported number of arguments.
    #[error("Incorrect parameter count in the call to native function '{function}': expected {expected}, got {actual}")]
    ArgumentCount {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    /// A column reference points past the end of the input chunk.
    #[error("Column index {index} out of range for chunk with {num_columns} columns")]
    ColumnOutOfRange { index: usize, num_columns: usize },

    /// Invalid evaluation configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal invariant violation (malformed state reached the evaluator).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Arrow interop failure at the chunk boundary.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
