//! Opcode tables for the PL/0 instruction set.
//!
//! The top-level opcode selects the instruction family. Two families carry a
//! nested operation in their `m` operand: `OPR` (arithmetic, relational and
//! return) and `SYS` (console I/O and halt).

use crate::error::DecodeError;

/// Identifies the instruction family.
///
/// The `#[repr(i32)]` attribute pins each variant to the integer stored in
/// the process address space.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push the literal `m`.
    Lit = 1,
    /// Arithmetic, relational or return operation selected by `m`.
    Opr = 2,
    /// Push the variable at lexical distance `l`, offset `m`.
    Lod = 3,
    /// Pop into the variable at lexical distance `l`, offset `m`.
    Sto = 4,
    /// Call the procedure at address `m` whose parent is `l` levels up.
    Cal = 5,
    /// Reserve (or release, when negative) `m` slots.
    Inc = 6,
    /// Unconditional jump to absolute address `m`.
    Jmp = 7,
    /// Pop; jump to `m` if the popped value is zero.
    Jpc = 8,
    /// System call selected by `m`.
    Sys = 9,
}

/// All opcodes, in numeric order.
pub const ALL_OPCODES: [Opcode; 9] = [
    Opcode::Lit,
    Opcode::Opr,
    Opcode::Lod,
    Opcode::Sto,
    Opcode::Cal,
    Opcode::Inc,
    Opcode::Jmp,
    Opcode::Jpc,
    Opcode::Sys,
];

impl Opcode {
    /// The canonical mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lit => "LIT",
            Opcode::Opr => "OPR",
            Opcode::Lod => "LOD",
            Opcode::Sto => "STO",
            Opcode::Cal => "CAL",
            Opcode::Inc => "INC",
            Opcode::Jmp => "JMP",
            Opcode::Jpc => "JPC",
            Opcode::Sys => "SYS",
        }
    }

    /// Look up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
            .copied()
    }
}

impl TryFrom<i32> for Opcode {
    type Error = DecodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::Lit),
            2 => Ok(Opcode::Opr),
            3 => Ok(Opcode::Lod),
            4 => Ok(Opcode::Sto),
            5 => Ok(Opcode::Cal),
            6 => Ok(Opcode::Inc),
            7 => Ok(Opcode::Jmp),
            8 => Ok(Opcode::Jpc),
            9 => Ok(Opcode::Sys),
            other => Err(DecodeError::InvalidOpcode(other)),
        }
    }
}

/// Sub-operations of the `OPR` family, selected by the `m` operand.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opr {
    /// Return from the current procedure.
    Rtn = 0,
    /// Negate the top value.
    Neg = 1,
    Add = 2,
    Sub = 3,
    Mul = 4,
    /// Truncating integer division.
    Div = 5,
    /// Replace the top value with its remainder modulo 2 (sign follows the dividend).
    Odd = 6,
    Mod = 7,
    Eql = 8,
    Neq = 9,
    Lss = 10,
    Leq = 11,
    Gtr = 12,
    Geq = 13,
}

/// All OPR sub-operations, in numeric order.
pub const ALL_OPRS: [Opr; 14] = [
    Opr::Rtn,
    Opr::Neg,
    Opr::Add,
    Opr::Sub,
    Opr::Mul,
    Opr::Div,
    Opr::Odd,
    Opr::Mod,
    Opr::Eql,
    Opr::Neq,
    Opr::Lss,
    Opr::Leq,
    Opr::Gtr,
    Opr::Geq,
];

impl Opr {
    /// The symbolic name printed in execution traces.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opr::Rtn => "RTN",
            Opr::Neg => "NEG",
            Opr::Add => "ADD",
            Opr::Sub => "SUB",
            Opr::Mul => "MUL",
            Opr::Div => "DIV",
            Opr::Odd => "ODD",
            Opr::Mod => "MOD",
            Opr::Eql => "EQL",
            Opr::Neq => "NEQ",
            Opr::Lss => "LSS",
            Opr::Leq => "LEQ",
            Opr::Gtr => "GTR",
            Opr::Geq => "GEQ",
        }
    }

    /// True for the operations that consume two values and produce one.
    pub fn is_binary(self) -> bool {
        !matches!(self, Opr::Rtn | Opr::Neg | Opr::Odd)
    }
}

impl TryFrom<i32> for Opr {
    type Error = DecodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| ALL_OPRS.get(idx).copied())
            .ok_or(DecodeError::InvalidOperation(value))
    }
}

/// Sub-operations of the `SYS` family, selected by the `m` operand.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sys {
    /// Pop and print the top value.
    Write = 1,
    /// Read an integer and push it.
    Read = 2,
    /// Stop the machine.
    Halt = 3,
}

impl Sys {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Sys::Write => "WRITE",
            Sys::Read => "READ",
            Sys::Halt => "HALT",
        }
    }
}

impl TryFrom<i32> for Sys {
    type Error = DecodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sys::Write),
            2 => Ok(Sys::Read),
            3 => Ok(Sys::Halt),
            other => Err(DecodeError::InvalidSyscall(other)),
        }
    }
}
