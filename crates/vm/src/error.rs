//! Runtime errors for the FrameCode machine.
//!
//! Every variant is fatal: nothing is caught and retried, and each maps
//! to exactly one process exit code via [`RuntimeError::exit_code`].

use framecode_common::{FrameKind, Opcode};
use thiserror::Error;

/// Errors raised during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Variable-slot operation on an absent local or temporary frame.
    #[error("{frame} frame does not exist")]
    FrameMissing { frame: FrameKind },

    /// DEFVAR with a name already defined in the target frame.
    #[error("attempt to redefine variable '{name}'")]
    Redefinition { name: String },

    /// Access to a name not defined in the resolved frame.
    #[error("variable '{name}' was not defined in the {frame} frame")]
    UndefinedVariable { frame: FrameKind, name: String },

    /// Read of a defined slot that has never been written.
    #[error("variable '{name}' in the {frame} frame has no value")]
    UninitializedValue { frame: FrameKind, name: String },

    /// JUMP/CALL/conditional jump to a label that was never declared.
    #[error("undefined label '{name}'")]
    UndefinedLabel { name: String },

    /// Instruction argument count differs from the opcode's fixed arity.
    #[error("{opcode} expects {expected} operand(s), got {found}")]
    WrongArity {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// Static operand kind outside the permitted set for its slot.
    #[error("wrong operand kind in slot {slot} of {opcode}")]
    WrongOperandKind { opcode: &'static str, slot: usize },

    /// Resolved runtime value has a type the opcode does not accept.
    #[error("wrong operand type for {opcode}")]
    WrongOperandType { opcode: &'static str },

    /// IDIV with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// EXIT operand outside [0, 50).
    #[error("invalid exit code {code}")]
    InvalidExitCode { code: i64 },

    /// String index outside the string's bounds.
    #[error("string index {index} out of range (length {length})")]
    StringIndexOutOfRange { index: i64, length: usize },

    /// INT2CHAR with a value that is not a Unicode scalar.
    #[error("invalid codepoint {code}")]
    InvalidCodepoint { code: i64 },

    /// POPS with nothing on the operand stack.
    #[error("operand stack is empty")]
    EmptyDataStack,

    /// RETURN with nothing on the call-return stack.
    #[error("call stack is empty")]
    EmptyCallStack,

    /// POPFRAME with nothing on the internal frame stack.
    #[error("frame stack is empty")]
    EmptyFrameStack,

    /// Input or output stream failure.
    #[error("stream error: {message}")]
    Stream { message: String },
}

impl RuntimeError {
    /// The process exit code this error terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Redefinition { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::WrongArity { .. }
            | RuntimeError::WrongOperandKind { .. } => 52,
            RuntimeError::WrongOperandType { .. } => 53,
            RuntimeError::UndefinedVariable { .. } => 54,
            RuntimeError::FrameMissing { .. } => 55,
            RuntimeError::UninitializedValue { .. }
            | RuntimeError::EmptyDataStack
            | RuntimeError::EmptyCallStack
            | RuntimeError::EmptyFrameStack => 56,
            RuntimeError::DivisionByZero | RuntimeError::InvalidExitCode { .. } => 57,
            RuntimeError::StringIndexOutOfRange { .. } | RuntimeError::InvalidCodepoint { .. } => {
                58
            }
            RuntimeError::Stream { .. } => 10,
        }
    }

    pub(crate) fn wrong_type(opcode: Opcode) -> Self {
        RuntimeError::WrongOperandType {
            opcode: opcode.name(),
        }
    }

    pub(crate) fn stream(err: std::io::Error) -> Self {
        RuntimeError::Stream {
            message: err.to_string(),
        }
    }
}
