//! FrameCode common types.
//!
//! This crate provides the foundational data structures shared by the
//! loader and the virtual machine:
//!
//! - [`Value`] — the tagged runtime value (int, bool, string, nil)
//! - [`Opcode`] — the closed set of 35 operations with static signatures
//! - [`Operand`] — static operand descriptors (literal / var / label / type)
//! - [`Instruction`] / [`Program`] — the loader's output
//! - [`LabelTable`] — label name → declaring position, duplicate-checked
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use instruction::Instruction;
pub use opcode::{Opcode, Signature, SlotKind, ALL_OPCODES};
pub use operand::{FrameKind, Operand, OperandKind};
pub use program::{DuplicateLabel, LabelTable, Program};
pub use value::{TypeName, Value};
