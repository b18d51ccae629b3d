//! Error types for the FrameCode loader.

use framecode_common::DuplicateLabel;
use thiserror::Error;

/// Errors produced while loading program text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A line with an order value but no opcode, or an order token that
    /// is not an integer at all.
    #[error("line {line}: malformed instruction record")]
    Malformed { line: usize },

    /// An unrecognized opcode name.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// A zero or negative order value.
    #[error("line {line}: order must be positive, got {order}")]
    BadOrder { line: usize, order: i64 },

    /// Two instructions sharing one order value.
    #[error("duplicate order {order}")]
    DuplicateOrder { order: usize },

    /// An operand token that fits no lexical category.
    #[error("line {line}: invalid operand '{token}'")]
    BadOperand { line: usize, token: String },

    /// The same label declared at two positions.
    #[error(transparent)]
    DuplicateLabel(#[from] DuplicateLabel),
}

impl LoadError {
    /// The process exit code this error terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Malformed { .. } => 31,
            LoadError::UnknownOpcode { .. }
            | LoadError::BadOrder { .. }
            | LoadError::DuplicateOrder { .. }
            | LoadError::BadOperand { .. } => 32,
            LoadError::DuplicateLabel(_) => 52,
        }
    }
}
