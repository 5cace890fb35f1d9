//! Runtime faults for the PL/0 machine.
//!
//! A fault is fatal: execution stops and the fault is reported, distinct
//! from a normal `SYS 0 3` halt. Every execution fault carries the line
//! (`PC / 3` of the faulting instruction) in `at`.

use thiserror::Error;

/// Errors that stop program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The program does not fit in the process address space.
    #[error("program needs {cells} cells but the address space holds {capacity}")]
    ProgramTooLarge { cells: usize, capacity: usize },

    /// A register or computed address fell outside the address space, or
    /// outside the region the access is allowed to touch.
    #[error("address {address} out of bounds at line {at}")]
    OutOfBounds { at: i32, address: i64 },

    /// DIV or MOD with a zero divisor.
    #[error("division by zero at line {at}")]
    DivisionByZero { at: i32 },

    /// The stack grew down into the global data region.
    #[error("stack collided with global data (SP {sp}, DP {dp}) at line {at}")]
    RegionCollision { at: i32, sp: i32, dp: i32 },

    /// A static or dynamic link does not point at an enclosing frame.
    #[error("malformed link {link} read from {address} at line {at}")]
    MalformedLink { at: i32, address: i32, link: i32 },

    /// The step ceiling was reached without a halt.
    #[error("no halt after {limit} instructions")]
    MissingHalt { limit: u64 },

    /// PC left the text region or is not on an instruction boundary.
    #[error("program counter {pc} outside the text region at line {at}")]
    PcOutOfText { at: i32, pc: i32 },

    /// Unknown opcode, unknown OPR/SYS operation, or negative lexical level.
    #[error("invalid instruction ({opcode} {l} {m}) at line {at}")]
    InvalidInstruction { at: i32, opcode: i32, l: i32, m: i32 },

    /// RTN executed while in the global scope.
    #[error("return outside of any procedure at line {at}")]
    ReturnFromGlobalScope { at: i32 },

    /// Pop or peek with no value in the current expression area.
    #[error("stack underflow at line {at}")]
    StackUnderflow { at: i32 },

    /// The integer read failed.
    #[error("input error at line {at}: {reason}")]
    Input { at: i32, reason: String },

    /// Writing program output or trace output failed.
    #[error("output error at line {at}: {reason}")]
    Output { at: i32, reason: String },
}
