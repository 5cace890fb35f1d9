//! Program representation for PL/0 instruction streams.
//!
//! A program is the ordered instruction sequence a compiler hands to the
//! machine. Two external forms exist: the sentinel-terminated cell stream
//! (`opcode l m` triples ending with opcode `-1`) and the binary `.pl0b`
//! file, a raw concatenation of 12-byte instructions with no header.

use crate::error::DecodeError;
use crate::instruction::{Instruction, CELLS_PER_INSTRUCTION, ENCODED_LEN, SENTINEL_OPCODE};

/// A PL/0 program: a sequence of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Read a sentinel-terminated cell stream.
    ///
    /// Triples are consumed until one whose opcode is `-1`; cells after the
    /// sentinel are ignored.
    pub fn from_cells(cells: &[i32]) -> Result<Self, DecodeError> {
        let mut instructions = Vec::new();
        let mut pos = 0;

        loop {
            let Some(&opcode) = cells.get(pos) else {
                return Err(DecodeError::MissingSentinel);
            };
            if opcode == SENTINEL_OPCODE {
                return Ok(Self { instructions });
            }
            let (Some(&l), Some(&m)) = (cells.get(pos + 1), cells.get(pos + 2)) else {
                return Err(DecodeError::TruncatedInstruction(pos));
            };
            instructions.push(Instruction::new(opcode, l, m));
            pos += CELLS_PER_INSTRUCTION;
        }
    }

    /// The text-region image: every instruction flattened to three cells.
    pub fn cells(&self) -> Vec<i32> {
        self.instructions.iter().flat_map(|i| i.cells()).collect()
    }

    /// Encode the entire program to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.instructions.len() * ENCODED_LEN);
        for instr in &self.instructions {
            bytes.extend_from_slice(&instr.encode());
        }
        bytes
    }

    /// Decode a byte slice into a program.
    ///
    /// The length must be a multiple of 12. Opcodes are not validated, except
    /// that the `-1` sentinel is rejected: it would end the program early once
    /// flattened to cells or written out as a listing.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % ENCODED_LEN != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let instructions = bytes
            .chunks_exact(ENCODED_LEN)
            .enumerate()
            .map(|(idx, chunk)| {
                let mut arr = [0u8; ENCODED_LEN];
                arr.copy_from_slice(chunk);
                let instr = Instruction::from_bytes(arr);
                if instr.opcode == SENTINEL_OPCODE {
                    return Err(DecodeError::UnexpectedSentinel(idx));
                }
                Ok(instr)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { instructions })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Sys;

    #[test]
    fn from_cells_stops_at_sentinel() {
        let cells = [1, 0, 5, 9, 0, 1, 9, 0, 3, -1, 0, 0, 7, 7, 7];
        let program = Program::from_cells(&cells).unwrap();
        assert_eq!(
            program.instructions,
            vec![
                Instruction::lit(5),
                Instruction::sys(Sys::Write),
                Instruction::sys(Sys::Halt),
            ]
        );
    }

    #[test]
    fn sentinel_alone_is_an_empty_program() {
        let program = Program::from_cells(&[-1]).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn from_cells_requires_sentinel() {
        assert_eq!(
            Program::from_cells(&[1, 0, 5]),
            Err(DecodeError::MissingSentinel)
        );
        assert_eq!(Program::from_cells(&[]), Err(DecodeError::MissingSentinel));
    }

    #[test]
    fn from_cells_rejects_partial_triple() {
        assert_eq!(
            Program::from_cells(&[1, 0, 5, 9, 0]),
            Err(DecodeError::TruncatedInstruction(3))
        );
    }

    #[test]
    fn cells_flatten_in_order() {
        let program = Program::new(vec![Instruction::lit(4), Instruction::new(7, 0, 0)]);
        assert_eq!(program.cells(), vec![1, 0, 4, 7, 0, 0]);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let program = Program::new(vec![
            Instruction::lit(-42),
            Instruction::sys(Sys::Halt),
        ]);
        let bytes = program.encode();
        assert_eq!(bytes.len(), 24);
        assert_eq!(Program::decode(&bytes), Ok(program));
    }

    #[test]
    fn decode_invalid_length() {
        assert_eq!(Program::decode(&[0; 13]), Err(DecodeError::InvalidLength(13)));
    }

    #[test]
    fn decode_rejects_sentinel_opcode() {
        let bytes = Program::new(vec![Instruction::lit(1), Instruction::new(-1, 0, 0)]).encode();
        assert_eq!(Program::decode(&bytes), Err(DecodeError::UnexpectedSentinel(1)));
    }

    #[test]
    fn decode_empty_bytes() {
        assert!(Program::decode(&[]).unwrap().is_empty());
    }
}
