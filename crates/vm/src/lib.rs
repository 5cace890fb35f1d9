//! PL/0 virtual machine: executes instruction streams produced by a PL/0
//! compiler.
//!
//! The machine is a fixed-size integer stack machine with:
//! - One process address space holding text, global data and the stack
//! - Activation records linked by static links for nested procedures
//! - A global scope that is not a frame: while `BP == GP`, expression
//!   temporaries live above the globals instead of on the stack
//!
//! # Usage
//!
//! ```
//! use pl0vm_common::{Instruction, Opr, Program, Sys};
//!
//! let program = Program::new(vec![
//!     Instruction::lit(3),
//!     Instruction::lit(4),
//!     Instruction::opr(Opr::Add),
//!     Instruction::sys(Sys::Write),
//!     Instruction::sys(Sys::Halt),
//! ]);
//!
//! let printed = pl0vm::run(&program, []).unwrap();
//! assert_eq!(printed, vec![7]);
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod io;
pub mod machine;
pub mod scope;
pub mod trace;

pub use config::{Mode, VmConfig};
pub use error::Fault;
pub use execute::Step;
pub use io::{Console, ScriptedConsole, StdConsole};
pub use machine::{Registers, Vm};
pub use trace::{TextTrace, TraceRecord, TraceSink};

use pl0vm_common::Program;

/// Execute a program in hardened mode with scripted input, returning every
/// value it printed.
///
/// # Errors
///
/// Returns [`Fault`] if execution fails (division by zero, out-of-bounds
/// access, malformed links, exhausted input, etc.).
pub fn run(program: &Program, inputs: impl IntoIterator<Item = i32>) -> Result<Vec<i32>, Fault> {
    run_with(program, VmConfig::default(), inputs)
}

/// Like [`run`], with an explicit configuration.
pub fn run_with(
    program: &Program,
    config: VmConfig,
    inputs: impl IntoIterator<Item = i32>,
) -> Result<Vec<i32>, Fault> {
    let mut console = ScriptedConsole::new(inputs);
    Vm::new(program, config, &mut console)?.run()?;
    Ok(console.into_outputs())
}
