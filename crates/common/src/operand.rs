//! Operand descriptors — the statically-known shape of instruction
//! arguments, built once by the loader and never mutated.

use std::fmt;

use crate::value::{TypeName, Value};

/// Selects one of the three frames of the frame store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    /// Parse the frame prefix of a variable reference (`GF`, `LF`, `TF`).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Global => "global",
            FrameKind::Local => "local",
            FrameKind::Temporary => "temporary",
        };
        f.write_str(name)
    }
}

/// The static kind tag of an operand, as carried by the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Int,
    Bool,
    String,
    Nil,
    Var,
    Label,
    Type,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Int => "int",
            OperandKind::Bool => "bool",
            OperandKind::String => "string",
            OperandKind::Nil => "nil",
            OperandKind::Var => "var",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        };
        f.write_str(name)
    }
}

/// One instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal value (`int@5`, `bool@true`, `string@ab`, `nil@nil`).
    Literal(Value),
    /// A frame-qualified variable reference (`GF@x`).
    Var { frame: FrameKind, name: String },
    /// A label name.
    Label(String),
    /// A type name (READ's second operand).
    Type(TypeName),
}

impl Operand {
    /// The static kind tag, used by the dispatcher's signature check.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Literal(Value::Int(_)) => OperandKind::Int,
            Operand::Literal(Value::Bool(_)) => OperandKind::Bool,
            Operand::Literal(Value::Str(_)) => OperandKind::String,
            Operand::Literal(Value::Nil) => OperandKind::Nil,
            Operand::Var { .. } => OperandKind::Var,
            Operand::Label(_) => OperandKind::Label,
            Operand::Type(_) => OperandKind::Type,
        }
    }
}
