//! PL/0 machine common types and instruction encoding.
//!
//! This crate provides the foundational data structures shared by the
//! engine, the assembler and the CLI:
//!
//! - [`Opcode`], [`Opr`], [`Sys`]: the instruction families and their sub-operations
//! - [`Instruction`]: the raw `(opcode, l, m)` triple, and [`Op`], its decoded form
//! - [`Program`]: an instruction sequence, with the sentinel loader and binary codec
//! - [`DecodeError`]: errors from decoding cell or byte streams

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::{Instruction, Op, CELLS_PER_INSTRUCTION, SENTINEL_OPCODE};
pub use opcode::{Opcode, Opr, Sys};
pub use program::Program;
