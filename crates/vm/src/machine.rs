//! Machine state: frame store, the two stacks, program counter, and the
//! injected I/O streams.

use std::io::{BufRead, Write};

use framecode_common::{LabelTable, Opcode, Operand, Program, Value};

use crate::error::RuntimeError;
use crate::frames::FrameStore;

/// How a program run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The program counter ran past the last instruction.
    Completed,
    /// An EXIT instruction executed with a code in [0, 50).
    Exit(i32),
}

/// The FrameCode machine.
///
/// All state is owned here and threaded through the fetch-execute loop by
/// exclusive mutable access; there are no ambient globals. The input
/// stream feeds READ, `output` receives WRITE, and `diag` receives
/// DPRINT/BREAK diagnostics.
pub struct Machine<'a> {
    pub(crate) program: &'a Program,
    pub(crate) labels: &'a LabelTable,
    pub(crate) frames: FrameStore,
    pub(crate) data_stack: Vec<Value>,
    /// Saved 1-based CALL positions, consumed by RETURN.
    pub(crate) call_stack: Vec<usize>,
    /// 0-based index into the instruction sequence.
    pub(crate) pc: usize,
    pub(crate) input: &'a mut dyn BufRead,
    pub(crate) output: &'a mut dyn Write,
    pub(crate) diag: &'a mut dyn Write,
}

impl<'a> Machine<'a> {
    pub fn new(
        program: &'a Program,
        labels: &'a LabelTable,
        input: &'a mut dyn BufRead,
        output: &'a mut dyn Write,
        diag: &'a mut dyn Write,
    ) -> Self {
        Self {
            program,
            labels,
            frames: FrameStore::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            input,
            output,
            diag,
        }
    }

    /// Pop the operand stack.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.data_stack.pop().ok_or(RuntimeError::EmptyDataStack)
    }

    /// The next program counter for a jump to `name`.
    ///
    /// A label's 1-based position equals the 0-based index of the
    /// instruction that follows it, so the resolved position is itself
    /// the pc at which execution resumes. The same arithmetic serves
    /// JUMP, CALL, RETURN, and the conditional jumps.
    pub(crate) fn resolve_target(&self, name: &str) -> Result<usize, RuntimeError> {
        self.labels
            .position(name)
            .ok_or_else(|| RuntimeError::UndefinedLabel { name: name.into() })
    }

    /// Resolve an operand to its runtime value: literals yield their
    /// encoded value, variable references go through the frame store.
    /// Shared by every handler; runs before any type-specific check.
    pub(crate) fn resolve(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Var { frame, name } => self.frames.read(*frame, name),
            // The signature check rejects these before any handler
            // resolves them; report the structural error if one slips by.
            Operand::Label(_) | Operand::Type(_) => Err(RuntimeError::WrongOperandKind {
                opcode: "",
                slot: 0,
            }),
        }
    }

    pub(crate) fn resolve_int(&self, op: &Operand, opcode: Opcode) -> Result<i64, RuntimeError> {
        match self.resolve(op)? {
            Value::Int(n) => Ok(n),
            _ => Err(RuntimeError::wrong_type(opcode)),
        }
    }

    pub(crate) fn resolve_bool(&self, op: &Operand, opcode: Opcode) -> Result<bool, RuntimeError> {
        match self.resolve(op)? {
            Value::Bool(b) => Ok(b),
            _ => Err(RuntimeError::wrong_type(opcode)),
        }
    }

    pub(crate) fn resolve_str(&self, op: &Operand, opcode: Opcode) -> Result<String, RuntimeError> {
        match self.resolve(op)? {
            Value::Str(s) => Ok(s),
            _ => Err(RuntimeError::wrong_type(opcode)),
        }
    }
}
