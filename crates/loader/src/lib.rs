//! Loader for FrameCode program text.
//!
//! The text format is one instruction record per line:
//!
//! ```text
//! <order> <OPCODE> [operand]*   # comment to end of line
//! ```
//!
//! Order values are positive integers; records are sorted by order and
//! then assigned contiguous 1-based positions. Operand kinds are decided
//! lexically (`GF@x` is a variable, `int@5` a literal, a bare word a
//! type name or label); the loader never checks arity or whether a kind
//! fits its slot — the machine does that per executed instruction.

pub mod error;

mod parse;

pub use error::LoadError;

use framecode_common::{Instruction, LabelTable, Program};
use parse::parse_line;

/// Parse program text into a program and its label table.
///
/// Returns the first error encountered.
pub fn load(source: &str) -> Result<(Program, LabelTable), LoadError> {
    let mut records = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(record) = parse_line(idx + 1, line)? {
            records.push(record);
        }
    }

    records.sort_by_key(|r| r.order);
    for pair in records.windows(2) {
        if pair[0].order == pair[1].order {
            return Err(LoadError::DuplicateOrder {
                order: pair[0].order,
            });
        }
    }

    let instructions: Vec<Instruction> = records
        .into_iter()
        .enumerate()
        .map(|(i, r)| Instruction::new(r.opcode, i + 1, r.operands))
        .collect();

    let labels = LabelTable::build(&instructions)?;
    Ok((Program::new(instructions), labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecode_common::Opcode;

    #[test]
    fn empty_source_is_an_empty_program() {
        let (program, labels) = load("# nothing here\n\n").unwrap();
        assert!(program.is_empty());
        assert!(labels.is_empty());
    }

    #[test]
    fn records_are_sorted_by_order() {
        let source = "3 WRITE GF@x\n1 DEFVAR GF@x\n2 MOVE GF@x int@1\n";
        let (program, _) = load(source).unwrap();
        let opcodes: Vec<_> = program.instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::DefVar, Opcode::Move, Opcode::Write]);
        // Positions are contiguous and 1-based after the sort.
        let positions: Vec<_> = program.instructions.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn orders_need_not_be_contiguous() {
        let source = "10 CREATEFRAME\n500 BREAK\n";
        let (program, _) = load(source).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.instructions[1].position, 2);
    }

    #[test]
    fn duplicate_order_is_rejected() {
        let source = "1 CREATEFRAME\n1 BREAK\n";
        assert_eq!(load(source), Err(LoadError::DuplicateOrder { order: 1 }));
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let source = "1 LABEL loop\n2 LABEL loop\n";
        let err = load(source).unwrap_err();
        assert_eq!(err.exit_code(), 52);
    }

    #[test]
    fn label_table_follows_sorted_positions() {
        let source = "5 LABEL end\n1 JUMP end\n";
        let (_, labels) = load(source).unwrap();
        assert_eq!(labels.position("end"), Some(2));
    }
}
