//! Error types for the PL/0 assembler.

use thiserror::Error;

/// Errors produced while assembling a text listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode or sub-operation mnemonic.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An instruction line did not have both operands.
    #[error("line {line}: {opcode} expects 2 operands")]
    MissingArgument { line: usize, opcode: String },

    /// A numeric literal could not be parsed or does not fit in an `i32`.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = AsmError::UnknownOpcode {
            line: 3,
            token: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_missing_argument() {
        let e = AsmError::MissingArgument {
            line: 7,
            opcode: "LOD".to_string(),
        };
        assert_eq!(e.to_string(), "line 7: LOD expects 2 operands");
    }

    #[test]
    fn error_display_invalid_number() {
        let e = AsmError::InvalidNumber {
            line: 2,
            token: "0xZZ".to_string(),
        };
        assert_eq!(e.to_string(), "line 2: invalid number '0xZZ'");
    }

    #[test]
    fn error_display_unexpected_token() {
        let e = AsmError::UnexpectedToken {
            line: 4,
            token: "EXTRA".to_string(),
        };
        assert_eq!(e.to_string(), "line 4: unexpected token 'EXTRA'");
    }
}
