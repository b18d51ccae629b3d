//! Instruction representation.

use crate::opcode::Opcode;
use crate::operand::Operand;

/// One instruction of a loaded program.
///
/// `position` is the 1-based sequential index assigned after the loader
/// sorts by the external order value. It is what CALL pushes onto the
/// call-return stack and what the label table stores; the program counter
/// (0-based) is a separate notion owned by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub position: usize,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, position: usize, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            position,
            operands,
        }
    }
}
