//! Line and operand parsing for the FrameCode text format.
//!
//! Parsing here is purely lexical: an operand's kind comes from its
//! spelling alone. Whether that kind is legal in its slot is the
//! dispatcher's job, checked when the instruction executes.

use framecode_common::{FrameKind, Opcode, Operand, TypeName, Value};

use crate::error::LoadError;

/// One instruction record with its external order value, before sorting
/// and position assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub order: usize,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

/// Parse a single source line.
///
/// Returns `Ok(None)` for blank lines and comment-only lines.
pub(crate) fn parse_line(line_num: usize, line: &str) -> Result<Option<Record>, LoadError> {
    let text = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    let mut tokens = text.split_whitespace();

    let Some(order_token) = tokens.next() else {
        return Ok(None);
    };
    let order: i64 = order_token
        .parse()
        .map_err(|_| LoadError::Malformed { line: line_num })?;
    if order <= 0 {
        return Err(LoadError::BadOrder {
            line: line_num,
            order,
        });
    }

    let opcode_token = tokens.next().ok_or(LoadError::Malformed { line: line_num })?;
    let opcode = Opcode::from_name(opcode_token).ok_or_else(|| LoadError::UnknownOpcode {
        line: line_num,
        token: opcode_token.to_string(),
    })?;

    let operands = tokens
        .map(|token| parse_operand(line_num, token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Record {
        order: order as usize,
        opcode,
        operands,
    }))
}

/// Classify and parse one operand token.
pub(crate) fn parse_operand(line_num: usize, token: &str) -> Result<Operand, LoadError> {
    let bad = || LoadError::BadOperand {
        line: line_num,
        token: token.to_string(),
    };

    let Some((prefix, rest)) = token.split_once('@') else {
        // A bare word: one of the four type names, otherwise a label.
        if let Some(t) = TypeName::from_name(token) {
            return Ok(Operand::Type(t));
        }
        if is_identifier(token) {
            return Ok(Operand::Label(token.to_string()));
        }
        return Err(bad());
    };

    match prefix {
        "GF" | "LF" | "TF" => {
            let frame = FrameKind::from_prefix(prefix).ok_or_else(bad)?;
            if !is_identifier(rest) {
                return Err(bad());
            }
            Ok(Operand::Var {
                frame,
                name: rest.to_string(),
            })
        }
        "int" => rest
            .parse::<i64>()
            .map(|n| Operand::Literal(Value::Int(n)))
            .map_err(|_| bad()),
        "bool" => match rest {
            "true" => Ok(Operand::Literal(Value::Bool(true))),
            "false" => Ok(Operand::Literal(Value::Bool(false))),
            _ => Err(bad()),
        },
        "string" => {
            if !escapes_are_well_formed(rest) {
                return Err(bad());
            }
            // Stored verbatim; WRITE decodes the escapes.
            Ok(Operand::Literal(Value::Str(rest.to_string())))
        }
        "nil" => match rest {
            "nil" => Ok(Operand::Literal(Value::Nil)),
            _ => Err(bad()),
        },
        _ => Err(bad()),
    }
}

/// Variable and label names: a letter or one of `_ - $ & % * ! ?` first,
/// then the same set plus digits.
fn is_identifier(name: &str) -> bool {
    const SPECIAL: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || SPECIAL.contains(&c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || SPECIAL.contains(&c))
}

/// Every backslash must start a three-decimal-digit escape.
fn escapes_are_well_formed(text: &str) -> bool {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\'
            && !(0..3).all(|_| chars.next().is_some_and(|d| d.is_ascii_digit()))
        {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line(1, ""), Ok(None));
        assert_eq!(parse_line(2, "   "), Ok(None));
        assert_eq!(parse_line(3, "# a comment"), Ok(None));
    }

    #[test]
    fn trailing_comment_is_stripped() {
        let record = parse_line(1, "1 CREATEFRAME # fresh temp").unwrap().unwrap();
        assert_eq!(record.opcode, Opcode::CreateFrame);
        assert!(record.operands.is_empty());
    }

    #[test]
    fn opcode_names_are_case_insensitive() {
        let record = parse_line(1, "1 defvar GF@x").unwrap().unwrap();
        assert_eq!(record.opcode, Opcode::DefVar);
    }

    #[test]
    fn order_must_be_a_positive_integer() {
        assert_eq!(parse_line(4, "abc MOVE"), Err(LoadError::Malformed { line: 4 }));
        assert_eq!(
            parse_line(5, "0 MOVE"),
            Err(LoadError::BadOrder { line: 5, order: 0 })
        );
        assert_eq!(
            parse_line(6, "-3 MOVE"),
            Err(LoadError::BadOrder { line: 6, order: -3 })
        );
    }

    #[test]
    fn order_without_opcode_is_malformed() {
        assert_eq!(parse_line(2, "7"), Err(LoadError::Malformed { line: 2 }));
        assert_eq!(parse_line(3, "7 # nothing"), Err(LoadError::Malformed { line: 3 }));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert_eq!(
            parse_line(1, "1 FROB"),
            Err(LoadError::UnknownOpcode {
                line: 1,
                token: "FROB".into()
            })
        );
    }

    #[test]
    fn variable_operands() {
        assert_eq!(
            parse_operand(1, "GF@counter"),
            Ok(Operand::Var {
                frame: FrameKind::Global,
                name: "counter".into()
            })
        );
        assert_eq!(
            parse_operand(1, "LF@_tmp1"),
            Ok(Operand::Var {
                frame: FrameKind::Local,
                name: "_tmp1".into()
            })
        );
        assert!(parse_operand(1, "TF@").is_err());
        assert!(parse_operand(1, "XF@v").is_err());
        assert!(parse_operand(1, "GF@1bad").is_err());
    }

    #[test]
    fn literal_operands() {
        assert_eq!(
            parse_operand(1, "int@-42"),
            Ok(Operand::Literal(Value::Int(-42)))
        );
        assert_eq!(
            parse_operand(1, "bool@true"),
            Ok(Operand::Literal(Value::Bool(true)))
        );
        assert_eq!(
            parse_operand(1, "nil@nil"),
            Ok(Operand::Literal(Value::Nil))
        );
        assert!(parse_operand(1, "int@4.5").is_err());
        assert!(parse_operand(1, "bool@True").is_err());
        assert!(parse_operand(1, "nil@none").is_err());
    }

    #[test]
    fn string_literals_keep_escapes_verbatim() {
        assert_eq!(
            parse_operand(1, "string@a\\032b"),
            Ok(Operand::Literal(Value::Str("a\\032b".into())))
        );
        // string@ alone is the empty string.
        assert_eq!(
            parse_operand(1, "string@"),
            Ok(Operand::Literal(Value::Str(String::new())))
        );
        assert!(parse_operand(1, "string@bad\\9escape").is_err());
        assert!(parse_operand(1, "string@trailing\\").is_err());
    }

    #[test]
    fn bare_words_are_types_or_labels() {
        assert_eq!(parse_operand(1, "int"), Ok(Operand::Type(TypeName::Int)));
        assert_eq!(parse_operand(1, "nil"), Ok(Operand::Type(TypeName::Nil)));
        assert_eq!(
            parse_operand(1, "loop-start"),
            Ok(Operand::Label("loop-start".into()))
        );
        assert!(parse_operand(1, "3way").is_err());
    }
}
