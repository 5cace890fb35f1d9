//! Instruction representation for the PL/0 machine.
//!
//! An instruction occupies three consecutive cells of the process address
//! space:
//! ```text
//! cell 0: opcode (i32)
//! cell 1: l      (i32)  lexical-level distance
//! cell 2: m      (i32)  literal, offset, address or sub-operation
//! ```
//! The binary file encoding is the same triple as three little-endian `i32`.

use crate::error::DecodeError;
use crate::opcode::{Opcode, Opr, Sys};

/// Number of PAS cells one instruction occupies.
pub const CELLS_PER_INSTRUCTION: usize = 3;

/// Number of bytes one instruction occupies in the binary encoding.
pub const ENCODED_LEN: usize = 12;

/// Opcode value that terminates an instruction stream handed over by a compiler.
pub const SENTINEL_OPCODE: i32 = -1;

/// A raw instruction triple, exactly as it sits in the text region.
///
/// Raw integers are kept so that a program can be copied into memory
/// verbatim. Use [`Instruction::decode`] to get the typed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: i32,
    pub l: i32,
    pub m: i32,
}

/// A decoded instruction, with the OPR and SYS sub-operations folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Lit(i32),
    Opr(Opr),
    Lod { l: i32, m: i32 },
    Sto { l: i32, m: i32 },
    Cal { l: i32, m: i32 },
    Inc(i32),
    Jmp(i32),
    Jpc(i32),
    Sys(Sys),
}

impl Instruction {
    /// Create an instruction from raw integers.
    pub fn new(opcode: i32, l: i32, m: i32) -> Self {
        Self { opcode, l, m }
    }

    /// Create an instruction from a typed opcode.
    pub fn op(opcode: Opcode, l: i32, m: i32) -> Self {
        Self::new(opcode as i32, l, m)
    }

    pub fn lit(m: i32) -> Self {
        Self::op(Opcode::Lit, 0, m)
    }

    pub fn opr(opr: Opr) -> Self {
        Self::op(Opcode::Opr, 0, opr as i32)
    }

    pub fn sys(sys: Sys) -> Self {
        Self::op(Opcode::Sys, 0, sys as i32)
    }

    /// Decode the raw triple into its typed form.
    pub fn decode(&self) -> Result<Op, DecodeError> {
        let (l, m) = (self.l, self.m);
        Ok(match Opcode::try_from(self.opcode)? {
            Opcode::Lit => Op::Lit(m),
            Opcode::Opr => Op::Opr(Opr::try_from(m)?),
            Opcode::Lod => Op::Lod { l, m },
            Opcode::Sto => Op::Sto { l, m },
            Opcode::Cal => Op::Cal { l, m },
            Opcode::Inc => Op::Inc(m),
            Opcode::Jmp => Op::Jmp(m),
            Opcode::Jpc => Op::Jpc(m),
            Opcode::Sys => Op::Sys(Sys::try_from(m)?),
        })
    }

    /// The name shown in execution traces.
    ///
    /// OPR instructions are named after their sub-operation; SYS keeps the
    /// family name. Undecodable instructions are shown as `???`.
    pub fn name(&self) -> &'static str {
        match Opcode::try_from(self.opcode) {
            Ok(Opcode::Opr) => Opr::try_from(self.m).map(Opr::mnemonic).unwrap_or("???"),
            Ok(op) => op.mnemonic(),
            Err(_) => "???",
        }
    }

    /// The three PAS cells of this instruction.
    pub fn cells(&self) -> [i32; CELLS_PER_INSTRUCTION] {
        [self.opcode, self.l, self.m]
    }

    /// Encode to 12 bytes (three little-endian `i32`).
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut bytes = [0u8; ENCODED_LEN];
        bytes[0..4].copy_from_slice(&self.opcode.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.l.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.m.to_le_bytes());
        bytes
    }

    /// Decode 12 bytes. No opcode validation happens here; the engine
    /// decides what to do with unknown opcodes.
    pub fn from_bytes(bytes: [u8; ENCODED_LEN]) -> Self {
        let word = |i: usize| i32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self::new(word(0), word(4), word(8))
    }
}

impl Op {
    /// Re-encode into a raw triple.
    pub fn to_instruction(self) -> Instruction {
        match self {
            Op::Lit(m) => Instruction::lit(m),
            Op::Opr(opr) => Instruction::opr(opr),
            Op::Lod { l, m } => Instruction::op(Opcode::Lod, l, m),
            Op::Sto { l, m } => Instruction::op(Opcode::Sto, l, m),
            Op::Cal { l, m } => Instruction::op(Opcode::Cal, l, m),
            Op::Inc(m) => Instruction::op(Opcode::Inc, 0, m),
            Op::Jmp(m) => Instruction::op(Opcode::Jmp, 0, m),
            Op::Jpc(m) => Instruction::op(Opcode::Jpc, 0, m),
            Op::Sys(sys) => Instruction::sys(sys),
        }
    }
}
