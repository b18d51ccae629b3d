//! Program and label-table representation.
//!
//! A program is the loader's output: instructions already sorted by the
//! external order value, with 1-based positions assigned. The label table
//! is built in a single left-to-right pass before execution starts.

use std::collections::HashMap;

use thiserror::Error;

use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operand::Operand;

/// A loaded FrameCode program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Instructions in execution order; `instructions[i].position == i + 1`.
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Declaring the same label name twice is a static error (exit code 52).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate label '{name}'")]
pub struct DuplicateLabel {
    pub name: String,
}

/// Label name → 1-based position of the declaring LABEL instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    map: HashMap<String, usize>,
}

impl LabelTable {
    /// Collect all labels in one left-to-right pass.
    ///
    /// Only LABEL instructions whose first operand is statically a label
    /// contribute an entry; a LABEL with a malformed operand is left for
    /// the dispatcher's kind check to reject at execution time.
    pub fn build(instructions: &[Instruction]) -> Result<Self, DuplicateLabel> {
        let mut map = HashMap::new();
        for instr in instructions {
            if instr.opcode != Opcode::Label {
                continue;
            }
            if let Some(Operand::Label(name)) = instr.operands.first() {
                if map.insert(name.clone(), instr.position).is_some() {
                    return Err(DuplicateLabel { name: name.clone() });
                }
            }
        }
        Ok(Self { map })
    }

    /// The 1-based position of the LABEL instruction declaring `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
