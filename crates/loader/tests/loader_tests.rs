//! Integration tests for the FrameCode loader: whole program texts,
//! loader/machine hand-off, and error cases.

use framecode_common::{FrameKind, Opcode, Operand, Value};
use framecode_loader::{load, LoadError};
use framecode_vm::{run, Termination};

/// Load and run a program against in-memory streams.
fn load_and_run(source: &str, input: &str) -> (Termination, String) {
    let (program, labels) = load(source).expect("program should load");
    let mut reader = input.as_bytes();
    let mut output = Vec::new();
    let mut diag = Vec::new();
    let termination = run(&program, &labels, &mut reader, &mut output, &mut diag)
        .expect("program should run");
    (termination, String::from_utf8(output).unwrap())
}

#[test]
fn arithmetic_program() {
    let source = "\
# computes (3 + 5) * 2
1 DEFVAR GF@x
2 MOVE GF@x int@3
3 ADD GF@x GF@x int@5
4 MUL GF@x GF@x int@2
5 WRITE GF@x
";
    let (termination, output) = load_and_run(source, "");
    assert_eq!(termination, Termination::Completed);
    assert_eq!(output, "16");
}

#[test]
fn countdown_loop_with_labels() {
    let source = "\
1 DEFVAR GF@i
2 MOVE GF@i int@3
3 LABEL again
4 WRITE GF@i
5 SUB GF@i GF@i int@1
6 JUMPIFNEQ again GF@i int@0
7 WRITE string@done
";
    let (termination, output) = load_and_run(source, "");
    assert_eq!(termination, Termination::Completed);
    assert_eq!(output, "321done");
}

#[test]
fn subroutine_with_frames() {
    let source = "\
1 CREATEFRAME
2 DEFVAR TF@arg
3 MOVE TF@arg string@world
4 PUSHFRAME
5 CALL greet
6 POPFRAME
7 EXIT int@0
8 LABEL greet
9 WRITE string@hello\\032
10 WRITE LF@arg
11 RETURN
";
    let (termination, output) = load_and_run(source, "");
    assert_eq!(termination, Termination::Exit(0));
    assert_eq!(output, "hello world");
}

#[test]
fn read_echo_program() {
    let source = "\
1 DEFVAR GF@line
2 READ GF@line string
3 WRITE GF@line
4 READ GF@line int
5 WRITE GF@line
";
    let (termination, output) = load_and_run(source, "echo\n7\n");
    assert_eq!(termination, Termination::Completed);
    assert_eq!(output, "echo7");
}

#[test]
fn out_of_order_source_executes_by_order_value() {
    let source = "\
20 WRITE GF@v
10 MOVE GF@v string@first
5 DEFVAR GF@v
";
    let (termination, output) = load_and_run(source, "");
    assert_eq!(termination, Termination::Completed);
    assert_eq!(output, "first");
}

#[test]
fn operand_kinds_are_lexical() {
    let source = "1 READ GF@x int\n2 TYPE GF@t GF@x\n";
    let (program, _) = load(source).unwrap();
    // `int` with no prefix is a type-name operand, not a label.
    assert!(matches!(
        program.instructions[0].operands[1],
        Operand::Type(_)
    ));
    assert_eq!(
        program.instructions[0].operands[0],
        Operand::Var {
            frame: FrameKind::Global,
            name: "x".into()
        }
    );
}

#[test]
fn string_escapes_survive_loading_verbatim() {
    let source = "1 MOVE GF@s string@a\\032b\n";
    let (program, _) = load(source).unwrap();
    assert_eq!(
        program.instructions[0].operands[1],
        Operand::Literal(Value::Str("a\\032b".into()))
    );
}

#[test]
fn loader_does_not_check_arity() {
    // Too few operands loads fine; the machine rejects it at execution.
    let source = "1 MOVE GF@x\n";
    let (program, labels) = load(source).unwrap();
    assert_eq!(program.instructions[0].opcode, Opcode::Move);

    let mut reader = "".as_bytes();
    let mut output = Vec::new();
    let mut diag = Vec::new();
    let err = run(&program, &labels, &mut reader, &mut output, &mut diag).unwrap_err();
    assert_eq!(err.exit_code(), 52);
}

#[test]
fn malformed_lines_map_to_31() {
    for source in ["x DEFVAR GF@a\n", "1\n"] {
        let err = load(source).unwrap_err();
        assert_eq!(err.exit_code(), 31, "source {source:?}");
    }
}

#[test]
fn structural_errors_map_to_32() {
    let cases = [
        "1 FROBNICATE\n",
        "0 CREATEFRAME\n",
        "1 CREATEFRAME\n1 BREAK\n",
        "1 MOVE GF@x int@notanumber\n",
        "1 MOVE GF@x bool@TRUE\n",
        "1 MOVE QF@x int@1\n",
    ];
    for source in cases {
        let err = load(source).unwrap_err();
        assert_eq!(err.exit_code(), 32, "source {source:?}");
    }
}

#[test]
fn duplicate_label_error_carries_the_name() {
    let source = "1 LABEL spot\n2 LABEL spot\n";
    match load(source).unwrap_err() {
        LoadError::DuplicateLabel(inner) => assert_eq!(inner.name, "spot"),
        other => panic!("unexpected error: {other:?}"),
    }
}
