//! Execution engine for FrameCode programs.
//!
//! The machine executes a loaded [`Program`](framecode_common::Program)
//! against its [`LabelTable`](framecode_common::LabelTable). Variable
//! memory lives in three frames (global, local, temporary) plus a stack
//! of saved local frames; an operand stack and a call-return stack exist
//! alongside, each independent of the others.
//!
//! I/O is injected: READ consumes the given reader, WRITE drives the
//! output writer, and DPRINT/BREAK report to a separate diagnostic
//! writer, so tests can run whole programs against in-memory buffers.

mod error;
mod execute;
mod frames;
mod machine;

pub use error::RuntimeError;
pub use machine::{Machine, Termination};

use std::io::{BufRead, Write};

use framecode_common::{LabelTable, Program};

/// Execute `program` from its first instruction to termination.
pub fn run(
    program: &Program,
    labels: &LabelTable,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<Termination, RuntimeError> {
    Machine::new(program, labels, input, output, diag).execute()
}
