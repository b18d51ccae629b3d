//! FrameCode interpreter — load a program document and execute it.
//!
//! Exit codes:
//! - 0–49: the program's own EXIT code (0 when it runs off the end)
//! - 10: usage error, unopenable file, or stream failure
//! - 31: malformed program document
//! - 32: structurally invalid program document
//! - 52–58: runtime errors, per the machine's error mapping

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process;

use framecode_vm::Termination;

struct Args {
    source: Option<String>,
    input: Option<String>,
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    if argv.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&mut io::stdout());
        process::exit(0);
    }

    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage(&mut io::stderr());
            process::exit(10);
        }
    };

    if let Err(code) = execute(&args) {
        process::exit(code);
    }
}

fn print_usage(out: &mut dyn Write) {
    let _ = writeln!(out, "Usage: framecode [--source FILE] [--input FILE]");
    let _ = writeln!(out);
    let _ = writeln!(out, "Options:");
    let _ = writeln!(out, "  --source FILE   Program document (default: stdin)");
    let _ = writeln!(out, "  --input FILE    Input stream for READ (default: stdin)");
    let _ = writeln!(out, "  --help          Show this help");
    let _ = writeln!(out);
    let _ = writeln!(out, "At least one of --source and --input must be given.");
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut source = None;
    let mut input = None;
    let mut iter = argv.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--source" => {
                let value = iter.next().ok_or("--source requires a file argument")?;
                source = Some(value.clone());
            }
            "--input" => {
                let value = iter.next().ok_or("--input requires a file argument")?;
                input = Some(value.clone());
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    // Both defaulting to stdin would make the streams ambiguous.
    if source.is_none() && input.is_none() {
        return Err("at least one of --source and --input is required".into());
    }

    Ok(Args { source, input })
}

fn execute(args: &Args) -> Result<(), i32> {
    let source = read_source(args.source.as_deref())?;

    let (program, labels) = framecode_loader::load(&source).map_err(|e| {
        eprintln!("error: {e}");
        e.exit_code()
    })?;

    let mut input = open_input(args.input.as_deref())?;
    let mut output = io::stdout();
    let mut diag = io::stderr();

    match framecode_vm::run(&program, &labels, &mut *input, &mut output, &mut diag) {
        Ok(Termination::Completed) => Ok(()),
        Ok(Termination::Exit(code)) => Err(code),
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(e.exit_code())
        }
    }
}

fn read_source(path: Option<&str>) -> Result<String, i32> {
    match path {
        Some(p) => fs::read_to_string(p).map_err(|e| {
            eprintln!("error: cannot read '{p}': {e}");
            10
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|e| {
                eprintln!("error: cannot read program from stdin: {e}");
                10
            })?;
            Ok(text)
        }
    }
}

fn open_input(path: Option<&str>) -> Result<Box<dyn BufRead>, i32> {
    match path {
        Some(p) => {
            let file = fs::File::open(p).map_err(|e| {
                eprintln!("error: cannot open '{p}': {e}");
                10
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
