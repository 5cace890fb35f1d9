//! Decode errors for PL/0 instruction streams.

use thiserror::Error;

/// Errors that occur while decoding instructions or loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Top-level opcode outside `1..=9`.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(i32),

    /// OPR sub-operation outside `0..=13`.
    #[error("invalid OPR operation: {0}")]
    InvalidOperation(i32),

    /// SYS sub-operation outside `1..=3`.
    #[error("invalid SYS operation: {0}")]
    InvalidSyscall(i32),

    /// Byte stream length is not a multiple of 12.
    #[error("invalid byte stream length: {0} (must be multiple of 12)")]
    InvalidLength(usize),

    /// A cell stream ended in the middle of an instruction.
    #[error("truncated instruction at cell {0}")]
    TruncatedInstruction(usize),

    /// A cell stream ended without the `-1` sentinel opcode.
    #[error("instruction stream is missing the -1 sentinel")]
    MissingSentinel,

    /// A binary program contains the `-1` sentinel opcode, which can only
    /// terminate a cell stream.
    #[error("sentinel opcode -1 at instruction {0}")]
    UnexpectedSentinel(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_opcode() {
        assert_eq!(DecodeError::InvalidOpcode(12).to_string(), "invalid opcode: 12");
    }

    #[test]
    fn display_invalid_operation() {
        assert_eq!(
            DecodeError::InvalidOperation(14).to_string(),
            "invalid OPR operation: 14"
        );
    }

    #[test]
    fn display_invalid_length() {
        assert_eq!(
            DecodeError::InvalidLength(7).to_string(),
            "invalid byte stream length: 7 (must be multiple of 12)"
        );
    }

    #[test]
    fn display_missing_sentinel() {
        assert_eq!(
            DecodeError::MissingSentinel.to_string(),
            "instruction stream is missing the -1 sentinel"
        );
    }

    #[test]
    fn display_unexpected_sentinel() {
        assert_eq!(
            DecodeError::UnexpectedSentinel(3).to_string(),
            "sentinel opcode -1 at instruction 3"
        );
    }
}
