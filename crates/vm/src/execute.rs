//! Fetch-execute loop, static signature dispatch, and opcode handlers.

use framecode_common::{FrameKind, Instruction, Opcode, Operand, TypeName, Value};

use crate::error::RuntimeError;
use crate::machine::{Machine, Termination};

/// The destination slot of an instruction whose signature starts with a
/// variable reference.
fn var_operand(instr: &Instruction, slot: usize) -> Result<(FrameKind, &str), RuntimeError> {
    match instr.operands.get(slot) {
        Some(Operand::Var { frame, name }) => Ok((*frame, name)),
        _ => Err(RuntimeError::WrongOperandKind {
            opcode: instr.opcode.name(),
            slot,
        }),
    }
}

fn label_operand(instr: &Instruction) -> Result<&str, RuntimeError> {
    match instr.operands.first() {
        Some(Operand::Label(name)) => Ok(name),
        _ => Err(RuntimeError::WrongOperandKind {
            opcode: instr.opcode.name(),
            slot: 0,
        }),
    }
}

/// Decode the four fixed escape sequences WRITE understands, in the
/// reference order.
fn decode_escapes(s: &str) -> String {
    s.replace("\\010", "\n")
        .replace("\\032", " ")
        .replace("\\035", "#")
        .replace("\\092", "\\")
}

/// Integer floor division (rounds toward negative infinity, like the
/// reference semantics; `/` in Rust truncates).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// The character at `index`, counting scalar values, or a range error.
fn char_at(s: &str, index: i64) -> Result<char, RuntimeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| RuntimeError::StringIndexOutOfRange {
            index,
            length: s.chars().count(),
        })
}

/// Nil-aware equality: nil equals only nil; any other type mismatch is a
/// runtime type error. Shared by EQ and the conditional jumps.
fn nil_aware_eq(a: &Value, b: &Value, opcode: Opcode) -> Result<bool, RuntimeError> {
    if *a == Value::Nil || *b == Value::Nil {
        return Ok(a == b);
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        _ => Err(RuntimeError::wrong_type(opcode)),
    }
}

impl<'a> Machine<'a> {
    /// Run until the program counter leaves the instruction sequence, an
    /// EXIT executes, or an error terminates the program.
    pub fn execute(&mut self) -> Result<Termination, RuntimeError> {
        let program = self.program;
        while self.pc < program.instructions.len() {
            let instr = &program.instructions[self.pc];
            self.check_signature(instr)?;
            self.pc += 1;

            match instr.opcode {
                Opcode::Move => self.exec_move(instr)?,
                Opcode::CreateFrame => self.frames.create_temp(),
                Opcode::PushFrame => self.frames.push_scope()?,
                Opcode::PopFrame => self.frames.pop_scope()?,
                Opcode::DefVar => self.exec_defvar(instr)?,
                Opcode::Call => self.exec_call(instr)?,
                Opcode::Return => self.exec_return()?,
                Opcode::Pushs => self.exec_pushs(instr)?,
                Opcode::Pops => self.exec_pops(instr)?,
                Opcode::Add => self.exec_arith(instr, i64::wrapping_add)?,
                Opcode::Sub => self.exec_arith(instr, i64::wrapping_sub)?,
                Opcode::Mul => self.exec_arith(instr, i64::wrapping_mul)?,
                Opcode::IDiv => self.exec_idiv(instr)?,
                Opcode::Lt => self.exec_order(instr, std::cmp::Ordering::Less)?,
                Opcode::Gt => self.exec_order(instr, std::cmp::Ordering::Greater)?,
                Opcode::Eq => self.exec_eq(instr)?,
                Opcode::And => self.exec_logic(instr, |a, b| a && b)?,
                Opcode::Or => self.exec_logic(instr, |a, b| a || b)?,
                Opcode::Not => self.exec_not(instr)?,
                Opcode::Int2Char => self.exec_int2char(instr)?,
                Opcode::Stri2Int => self.exec_stri2int(instr)?,
                Opcode::Read => self.exec_read(instr)?,
                Opcode::Write => self.exec_write(instr)?,
                Opcode::Concat => self.exec_concat(instr)?,
                Opcode::StrLen => self.exec_strlen(instr)?,
                Opcode::GetChar => self.exec_getchar(instr)?,
                Opcode::SetChar => self.exec_setchar(instr)?,
                Opcode::Type => self.exec_type(instr)?,
                Opcode::Label => {} // indexed before execution
                Opcode::Jump => self.exec_jump(instr)?,
                Opcode::JumpIfEq => self.exec_jumpif(instr, false)?,
                Opcode::JumpIfNeq => self.exec_jumpif(instr, true)?,
                Opcode::Exit => return self.exec_exit(instr),
                Opcode::DPrint => self.exec_dprint(instr)?,
                Opcode::Break => self.exec_break(instr)?,
            }
        }
        Ok(Termination::Completed)
    }

    /// Structural check: arity, then per-slot static operand kind. Runs
    /// once per executed instruction, before the handler touches any
    /// state.
    fn check_signature(&self, instr: &Instruction) -> Result<(), RuntimeError> {
        let sig = instr.opcode.signature();
        if instr.operands.len() != sig.arity() {
            return Err(RuntimeError::WrongArity {
                opcode: instr.opcode.name(),
                expected: sig.arity(),
                found: instr.operands.len(),
            });
        }
        for (slot, (kind, operand)) in sig.slots.iter().zip(&instr.operands).enumerate() {
            if !kind.permits(operand.kind()) {
                return Err(RuntimeError::WrongOperandKind {
                    opcode: instr.opcode.name(),
                    slot,
                });
            }
        }
        Ok(())
    }

    /// Write a result into the destination variable (slot 0).
    fn store(&mut self, instr: &Instruction, value: Value) -> Result<(), RuntimeError> {
        let (frame, name) = var_operand(instr, 0)?;
        self.frames.write(frame, name, value)
    }

    // ---- Data movement and frames ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[1])?;
        self.store(instr, value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (frame, name) = var_operand(instr, 0)?;
        self.frames.define(frame, name)
    }

    // ---- Operand stack ----

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        self.data_stack.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        self.store(instr, value)
    }

    // ---- Arithmetic ----

    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let a = self.resolve_int(&instr.operands[1], instr.opcode)?;
        let b = self.resolve_int(&instr.operands[2], instr.opcode)?;
        self.store(instr, Value::Int(op(a, b)))
    }

    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve_int(&instr.operands[1], instr.opcode)?;
        let b = self.resolve_int(&instr.operands[2], instr.opcode)?;
        if b == 0 {
            return Err(RuntimeError::DivisionByZero);
        }
        self.store(instr, Value::Int(floor_div(a, b)))
    }

    // ---- Relational and logical ----

    fn exec_order(
        &mut self,
        instr: &Instruction,
        want: std::cmp::Ordering,
    ) -> Result<(), RuntimeError> {
        let a = self.resolve(&instr.operands[1])?;
        let b = self.resolve(&instr.operands[2])?;
        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            // false < true
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => return Err(RuntimeError::wrong_type(instr.opcode)),
        };
        self.store(instr, Value::Bool(ordering == want))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve(&instr.operands[1])?;
        let b = self.resolve(&instr.operands[2])?;
        let eq = nil_aware_eq(&a, &b, instr.opcode)?;
        self.store(instr, Value::Bool(eq))
    }

    fn exec_logic(
        &mut self,
        instr: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let a = self.resolve_bool(&instr.operands[1], instr.opcode)?;
        let b = self.resolve_bool(&instr.operands[2], instr.opcode)?;
        self.store(instr, Value::Bool(op(a, b)))
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve_bool(&instr.operands[1], instr.opcode)?;
        self.store(instr, Value::Bool(!a))
    }

    // ---- Conversions and strings ----

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let code = self.resolve_int(&instr.operands[1], instr.opcode)?;
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodepoint { code })?;
        self.store(instr, Value::Str(ch.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.resolve_str(&instr.operands[1], instr.opcode)?;
        let index = self.resolve_int(&instr.operands[2], instr.opcode)?;
        let ch = char_at(&s, index)?;
        self.store(instr, Value::Int(ch as i64))
    }

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let mut a = self.resolve_str(&instr.operands[1], instr.opcode)?;
        let b = self.resolve_str(&instr.operands[2], instr.opcode)?;
        a.push_str(&b);
        self.store(instr, Value::Str(a))
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.resolve_str(&instr.operands[1], instr.opcode)?;
        self.store(instr, Value::Int(s.chars().count() as i64))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.resolve_str(&instr.operands[1], instr.opcode)?;
        let index = self.resolve_int(&instr.operands[2], instr.opcode)?;
        let ch = char_at(&s, index)?;
        self.store(instr, Value::Str(ch.to_string()))
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (frame, name) = var_operand(instr, 0)?;
        let current = match self.frames.read(frame, name)? {
            Value::Str(s) => s,
            _ => return Err(RuntimeError::wrong_type(instr.opcode)),
        };
        let index = self.resolve_int(&instr.operands[1], instr.opcode)?;
        let replacement = self.resolve_str(&instr.operands[2], instr.opcode)?;
        let ch = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::StringIndexOutOfRange {
                index: 0,
                length: 0,
            })?;
        // Validate the index against the current contents first.
        char_at(&current, index)?;
        let result: String = current
            .chars()
            .enumerate()
            .map(|(i, c)| if i as i64 == index { ch } else { c })
            .collect();
        self.frames.write(frame, name, Value::Str(result))
    }

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let name = match &instr.operands[1] {
            // An unset variable reports the empty string; an undefined
            // name or missing frame is still an error.
            Operand::Var { frame, name } => match self.frames.peek(*frame, name)? {
                Some(value) => value.type_name(),
                None => "",
            },
            Operand::Literal(value) => value.type_name(),
            _ => {
                return Err(RuntimeError::WrongOperandKind {
                    opcode: instr.opcode.name(),
                    slot: 1,
                })
            }
        };
        self.store(instr, Value::Str(name.to_string()))
    }

    // ---- Control flow ----

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.resolve_target(label_operand(instr)?)?;
        self.call_stack.push(instr.position);
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        // A CALL at 1-based position P sits at index P-1, so resuming at
        // index P is the instruction immediately after it.
        let position = self.call_stack.pop().ok_or(RuntimeError::EmptyCallStack)?;
        self.pc = position;
        Ok(())
    }

    fn exec_jump(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.pc = self.resolve_target(label_operand(instr)?)?;
        Ok(())
    }

    fn exec_jumpif(&mut self, instr: &Instruction, negate: bool) -> Result<(), RuntimeError> {
        let a = self.resolve(&instr.operands[1])?;
        let b = self.resolve(&instr.operands[2])?;
        let eq = nil_aware_eq(&a, &b, instr.opcode)?;
        if eq != negate {
            self.pc = self.resolve_target(label_operand(instr)?)?;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Termination, RuntimeError> {
        let code = self.resolve_int(&instr.operands[0], instr.opcode)?;
        if (0..50).contains(&code) {
            Ok(Termination::Exit(code as i32))
        } else {
            Err(RuntimeError::InvalidExitCode { code })
        }
    }

    // ---- I/O and debug ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let requested = match &instr.operands[1] {
            Operand::Type(t) => *t,
            _ => {
                return Err(RuntimeError::WrongOperandKind {
                    opcode: instr.opcode.name(),
                    slot: 1,
                })
            }
        };

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .map_err(RuntimeError::stream)?;

        let value = if n == 0 {
            // End of input is not an error; the destination becomes nil.
            Value::Nil
        } else {
            let line = line.trim_end_matches(['\n', '\r']);
            match requested {
                TypeName::Int => match line.trim().parse::<i64>() {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Nil,
                },
                TypeName::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
                TypeName::String => Value::Str(line.to_string()),
                TypeName::Nil => Value::Nil,
            }
        };
        self.store(instr, value)
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        let text = match &value {
            Value::Str(s) => decode_escapes(s),
            other => other.to_string(),
        };
        write!(self.output, "{text}").map_err(RuntimeError::stream)
    }

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        write!(self.diag, "{value}").map_err(RuntimeError::stream)
    }

    fn exec_break(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        writeln!(self.diag, "Position in code: {}", instr.position)
            .map_err(RuntimeError::stream)?;
        writeln!(self.diag, "Global frame:").map_err(RuntimeError::stream)?;
        for (name, value) in self.frames.global_slots() {
            let (text, type_name) = match value {
                Some(v) => (v.to_string(), v.type_name()),
                None => ("none".to_string(), "none"),
            };
            writeln!(self.diag, "{name}, {text}, {type_name}").map_err(RuntimeError::stream)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_div_matches_floor_semantics() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(floor_div(-7, -2), 3);
        assert_eq!(floor_div(6, 3), 2);
        assert_eq!(floor_div(-6, 3), -2);
    }

    #[test]
    fn decode_escapes_fixed_sequences() {
        assert_eq!(decode_escapes("a\\032b"), "a b");
        assert_eq!(decode_escapes("line\\010next"), "line\nnext");
        assert_eq!(decode_escapes("\\035\\092"), "#\\");
        assert_eq!(decode_escapes("plain"), "plain");
    }

    #[test]
    fn char_at_bounds() {
        assert_eq!(char_at("hi", 0), Ok('h'));
        assert_eq!(char_at("hi", 1), Ok('i'));
        assert_eq!(
            char_at("hi", 5),
            Err(RuntimeError::StringIndexOutOfRange {
                index: 5,
                length: 2
            })
        );
        assert_eq!(
            char_at("hi", -1),
            Err(RuntimeError::StringIndexOutOfRange {
                index: -1,
                length: 2
            })
        );
    }

    proptest::proptest! {
        #[test]
        fn floor_div_agrees_with_remainder(a in -10_000i64..10_000, b in -100i64..100) {
            proptest::prop_assume!(b != 0);
            let q = floor_div(a, b);
            let r = a - q * b;
            // Floor division leaves a remainder with the divisor's sign.
            proptest::prop_assert!(r == 0 || (r < 0) == (b < 0));
            proptest::prop_assert!(r.abs() < b.abs());
        }
    }

    #[test]
    fn nil_aware_equality() {
        assert_eq!(
            nil_aware_eq(&Value::Nil, &Value::Nil, Opcode::Eq),
            Ok(true)
        );
        assert_eq!(
            nil_aware_eq(&Value::Nil, &Value::Int(0), Opcode::Eq),
            Ok(false)
        );
        assert_eq!(
            nil_aware_eq(&Value::Int(1), &Value::Int(1), Opcode::Eq),
            Ok(true)
        );
        assert_eq!(
            nil_aware_eq(&Value::Int(1), &Value::Bool(true), Opcode::Eq),
            Err(RuntimeError::WrongOperandType { opcode: "EQ" })
        );
    }
}
