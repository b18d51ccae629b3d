//! Runtime value representation for the FrameCode machine.
//!
//! Values live in variable slots and on the operand stack. Every value
//! carries its tag; there is no untagged nil.

use std::fmt;

/// A tagged runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Character string. Escape sequences from the source document are
    /// stored verbatim; WRITE decodes them at print time.
    Str(String),
    /// The nil value.
    Nil,
}

impl Value {
    /// The type name used by the TYPE opcode and in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Nil => "nil",
        }
    }
}

/// Raw textual form: decimal for ints, `true`/`false` for bools, the
/// stored string for strings, and the empty string for nil. WRITE applies
/// escape decoding on top of this; DPRINT emits it as-is.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => f.write_str(s),
            Value::Nil => Ok(()),
        }
    }
}

/// One of the four requestable type names (the READ opcode's second
/// operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Bool,
    String,
    Nil,
}

impl TypeName {
    /// Parse a type name as it appears in the source document.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(TypeName::Int),
            "bool" => Some(TypeName::Bool),
            "string" => Some(TypeName::String),
            "nil" => Some(TypeName::Nil),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::Bool => "bool",
            TypeName::String => "string",
            TypeName::Nil => "nil",
        }
    }
}
