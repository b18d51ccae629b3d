//! Opcode definitions and static signatures for the FrameCode
//! instruction set.

use crate::operand::OperandKind;

/// Identifies the operation to perform.
///
/// The set is closed: every opcode has exactly one handler in the vm and
/// exactly one signature entry below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Data movement
    Move,
    // Frame lifecycle
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar,
    // Call / return
    Call,
    Return,
    // Operand stack
    Pushs,
    Pops,
    // Arithmetic
    Add,
    Sub,
    Mul,
    IDiv,
    // Relational
    Lt,
    Gt,
    Eq,
    // Logical
    And,
    Or,
    Not,
    // Conversions
    Int2Char,
    Stri2Int,
    // I/O
    Read,
    Write,
    // Strings
    Concat,
    StrLen,
    GetChar,
    SetChar,
    // Type introspection
    Type,
    // Control flow
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    Exit,
    // Debug
    DPrint,
    Break,
}

/// Every opcode, in the order they appear in the reference table.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

/// Permitted static operand kinds for one positional slot.
///
/// "Symb" slots accept any literal or a variable reference; the typed
/// variants narrow the literal kinds but still accept a variable, whose
/// runtime type is checked by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A variable reference only.
    Var,
    /// Any literal or a variable reference.
    Symb,
    /// An int literal or a variable reference.
    IntSymb,
    /// A bool literal or a variable reference.
    BoolSymb,
    /// A string literal or a variable reference.
    StrSymb,
    /// A label name only.
    Label,
    /// A type name only.
    Type,
}

impl SlotKind {
    /// Does this slot accept an operand of the given static kind?
    pub fn permits(self, kind: OperandKind) -> bool {
        match self {
            SlotKind::Var => kind == OperandKind::Var,
            SlotKind::Symb => matches!(
                kind,
                OperandKind::Int
                    | OperandKind::Bool
                    | OperandKind::String
                    | OperandKind::Nil
                    | OperandKind::Var
            ),
            SlotKind::IntSymb => matches!(kind, OperandKind::Int | OperandKind::Var),
            SlotKind::BoolSymb => matches!(kind, OperandKind::Bool | OperandKind::Var),
            SlotKind::StrSymb => matches!(kind, OperandKind::String | OperandKind::Var),
            SlotKind::Label => kind == OperandKind::Label,
            SlotKind::Type => kind == OperandKind::Type,
        }
    }
}

/// The fixed arity and per-slot kind sets of one opcode.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub slots: &'static [SlotKind],
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.slots.len()
    }
}

use SlotKind::{BoolSymb, IntSymb, StrSymb, Symb};

const NONE: Signature = Signature { slots: &[] };
const VAR: Signature = Signature {
    slots: &[SlotKind::Var],
};
const SYMB: Signature = Signature { slots: &[Symb] };
const LABEL: Signature = Signature {
    slots: &[SlotKind::Label],
};
const VAR_SYMB: Signature = Signature {
    slots: &[SlotKind::Var, Symb],
};
const VAR_SYMB_SYMB: Signature = Signature {
    slots: &[SlotKind::Var, Symb, Symb],
};
const VAR_INT_INT: Signature = Signature {
    slots: &[SlotKind::Var, IntSymb, IntSymb],
};
const VAR_BOOL_BOOL: Signature = Signature {
    slots: &[SlotKind::Var, BoolSymb, BoolSymb],
};
const VAR_BOOL: Signature = Signature {
    slots: &[SlotKind::Var, BoolSymb],
};
const VAR_INT: Signature = Signature {
    slots: &[SlotKind::Var, IntSymb],
};
const VAR_STR: Signature = Signature {
    slots: &[SlotKind::Var, StrSymb],
};
const VAR_STR_INT: Signature = Signature {
    slots: &[SlotKind::Var, StrSymb, IntSymb],
};
const VAR_INT_STR: Signature = Signature {
    slots: &[SlotKind::Var, IntSymb, StrSymb],
};
const VAR_TYPE: Signature = Signature {
    slots: &[SlotKind::Var, SlotKind::Type],
};
const LABEL_SYMB_SYMB: Signature = Signature {
    slots: &[SlotKind::Label, Symb, Symb],
};
const INT: Signature = Signature { slots: &[IntSymb] };

impl Opcode {
    /// Parse an opcode name from the source document (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The canonical (uppercase) mnemonic.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// The fixed signature checked by the dispatcher before the handler
    /// runs.
    pub fn signature(self) -> Signature {
        match self {
            Opcode::Move => VAR_SYMB,
            Opcode::CreateFrame => NONE,
            Opcode::PushFrame => NONE,
            Opcode::PopFrame => NONE,
            Opcode::DefVar => VAR,
            Opcode::Call => LABEL,
            Opcode::Return => NONE,
            Opcode::Pushs => SYMB,
            Opcode::Pops => VAR,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::IDiv => VAR_INT_INT,
            Opcode::Lt | Opcode::Gt | Opcode::Eq => VAR_SYMB_SYMB,
            Opcode::And | Opcode::Or => VAR_BOOL_BOOL,
            Opcode::Not => VAR_BOOL,
            Opcode::Int2Char => VAR_INT,
            Opcode::Stri2Int => VAR_STR_INT,
            Opcode::Read => VAR_TYPE,
            Opcode::Write => SYMB,
            Opcode::Concat => VAR_SYMB_SYMB,
            Opcode::StrLen => VAR_STR,
            Opcode::GetChar => VAR_STR_INT,
            Opcode::SetChar => VAR_INT_STR,
            Opcode::Type => VAR_SYMB,
            Opcode::Label => LABEL,
            Opcode::Jump => LABEL,
            Opcode::JumpIfEq | Opcode::JumpIfNeq => LABEL_SYMB_SYMB,
            Opcode::Exit => INT,
            Opcode::DPrint => SYMB,
            Opcode::Break => NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(Opcode::from_name("MOVE"), Some(Opcode::Move));
        assert_eq!(Opcode::from_name("move"), Some(Opcode::Move));
        assert_eq!(Opcode::from_name("dEfVaR"), Some(Opcode::DefVar));
        assert_eq!(Opcode::from_name("JUMPIFNEQ"), Some(Opcode::JumpIfNeq));
        assert_eq!(Opcode::from_name("NOP"), None);
    }

    #[test]
    fn every_opcode_roundtrips_through_its_name() {
        for op in ALL_OPCODES {
            assert_eq!(Opcode::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn arities_match_reference_table() {
        assert_eq!(Opcode::CreateFrame.signature().arity(), 0);
        assert_eq!(Opcode::Break.signature().arity(), 0);
        assert_eq!(Opcode::DefVar.signature().arity(), 1);
        assert_eq!(Opcode::Exit.signature().arity(), 1);
        assert_eq!(Opcode::Move.signature().arity(), 2);
        assert_eq!(Opcode::Not.signature().arity(), 2);
        assert_eq!(Opcode::Read.signature().arity(), 2);
        assert_eq!(Opcode::Add.signature().arity(), 3);
        assert_eq!(Opcode::SetChar.signature().arity(), 3);
        assert_eq!(Opcode::JumpIfEq.signature().arity(), 3);
    }

    #[test]
    fn symb_slots_accept_every_literal_and_var() {
        for kind in [
            OperandKind::Int,
            OperandKind::Bool,
            OperandKind::String,
            OperandKind::Nil,
            OperandKind::Var,
        ] {
            assert!(Symb.permits(kind), "{kind} should be a symb");
        }
        assert!(!Symb.permits(OperandKind::Label));
        assert!(!Symb.permits(OperandKind::Type));
    }

    #[test]
    fn typed_symb_slots_narrow_literals_but_keep_var() {
        assert!(IntSymb.permits(OperandKind::Int));
        assert!(IntSymb.permits(OperandKind::Var));
        assert!(!IntSymb.permits(OperandKind::Bool));
        assert!(BoolSymb.permits(OperandKind::Bool));
        assert!(!BoolSymb.permits(OperandKind::String));
        assert!(StrSymb.permits(OperandKind::String));
        assert!(!StrSymb.permits(OperandKind::Nil));
    }

    #[test]
    fn var_label_type_slots_are_exact() {
        assert!(SlotKind::Var.permits(OperandKind::Var));
        assert!(!SlotKind::Var.permits(OperandKind::Int));
        assert!(SlotKind::Label.permits(OperandKind::Label));
        assert!(!SlotKind::Label.permits(OperandKind::Type));
        assert!(SlotKind::Type.permits(OperandKind::Type));
        assert!(!SlotKind::Type.permits(OperandKind::Label));
    }
}
