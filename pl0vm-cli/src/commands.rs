//! CLI command implementations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pl0vm::{Mode, StdConsole, TextTrace, Vm, VmConfig};
use pl0vm_common::Program;
use tracing::debug;

use crate::RunArgs;

const BINARY_EXTENSION: &str = "pl0b";

/// Load a program: `.pl0b` files are decoded as binary, anything else is
/// assembled as a text listing.
fn load_program(path: &Path) -> Result<Program, i32> {
    let shown = path.display();
    let program = if path.extension().is_some_and(|ext| ext == BINARY_EXTENSION) {
        let bytes = fs::read(path).map_err(|e| {
            eprintln!("error: cannot read '{shown}': {e}");
            1
        })?;
        Program::decode(&bytes).map_err(|e| {
            eprintln!("error: {shown}: {e}");
            1
        })?
    } else {
        let text = fs::read_to_string(path).map_err(|e| {
            eprintln!("error: cannot read '{shown}': {e}");
            1
        })?;
        pl0vm_assembler::assemble(&text).map_err(|e| {
            eprintln!("error: {shown}: {e}");
            1
        })?
    };
    debug!(path = %shown, instructions = program.len(), "program read");
    Ok(program)
}

/// Execute a program against stdin/stdout.
pub fn run(args: &RunArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;

    let mut config = VmConfig::default()
        .with_capacity(args.capacity)
        .with_mode(if args.compat {
            Mode::Compatibility
        } else {
            Mode::Hardened
        });
    if let Some(limit) = args.max_steps {
        config = config.with_step_limit(limit);
    }

    let stdin = io::stdin();
    let mut console = StdConsole::new(stdin.lock(), io::stdout());
    let mut trace = TextTrace::new(io::stdout());

    let vm = Vm::new(&program, config, &mut console).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    let mut vm = if args.trace { vm.with_trace(&mut trace) } else { vm };

    match vm.run() {
        Ok(steps) => {
            debug!(steps, "run complete");
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime fault: {e}");
            Err(3)
        }
    }
}

/// Assemble a text listing to a `.pl0b` binary.
pub fn assemble(input: &Path, output: Option<&Path>) -> Result<(), i32> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", input.display());
        1
    })?;

    let program = pl0vm_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = program.encode();
    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{}': {e}", output.display());
        1
    })?;

    eprintln!(
        "assembled {} instructions ({} bytes) -> {}",
        program.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

/// Disassemble a program to a text listing on stdout.
pub fn disassemble(input: &Path) -> Result<(), i32> {
    let program = load_program(input)?;
    print!("{}", pl0vm_assembler::disassemble(&program));
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension(BINARY_EXTENSION)
}
