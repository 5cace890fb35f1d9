//! PL/0 assembler: text listing ↔ program translation.
//!
//! A listing has one instruction per line, `<op> <l> <m>`, where `<op>` is a
//! mnemonic (`LIT OPR LOD STO CAL INC JMP JPC SYS`) or a raw opcode number.
//! This accepts both the symbolic form and the bare numeric triples a PL/0
//! compiler emits. A line whose opcode is `-1` ends the listing.
//!
//! # Usage
//!
//! ```
//! use pl0vm_assembler::{assemble, disassemble};
//!
//! let program = assemble("LIT 0 5\nSYS 0 1\nSYS 0 3\n").unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(assemble(&disassemble(&program)).unwrap(), program);
//! ```

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use parser::{parse_line, Line};
use pl0vm_common::Program;

/// Assemble a listing into a program.
///
/// Returns the first error encountered. Everything after a `-1` sentinel
/// line is ignored.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        match parse_line(&tokens, line_num)? {
            Some(Line::Instr(instr)) => instructions.push(instr),
            Some(Line::End) => break,
            None => {}
        }
    }

    Ok(Program::new(instructions))
}

/// Disassemble a program into a canonical listing.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl0vm_common::{Instruction, Opr, Sys};

    #[test]
    fn assemble_minimal() {
        let program = assemble("LIT 0 5\nSYS 0 1\nSYS 0 3\n").unwrap();
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
    fn assemble_compiler_output() {
        let program = assemble("7 0 3\n9 0 3\n-1 -1 -1\n").unwrap();
        assert_eq!(program.cells(), vec![7, 0, 3, 9, 0, 3]);
    }

    #[test]
    fn lines_after_sentinel_are_ignored() {
        let program = assemble("LIT 0 1\n-1 0 0\nnot even tokens !!\n").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn disassemble_minimal() {
        let program = Program::new(vec![Instruction::lit(5), Instruction::opr(Opr::Add)]);
        assert_eq!(disassemble(&program), "LIT 0 5\nOPR 0 2     ; ADD\n");
    }

    #[test]
    fn roundtrip_disassemble_then_assemble() {
        let original = Program::new(vec![
            Instruction::new(7, 0, 6),
            Instruction::lit(-3),
            Instruction::opr(Opr::Neg),
            Instruction::new(13, 4, 4),
            Instruction::sys(Sys::Halt),
        ]);
        let text = disassemble(&original);
        assert_eq!(assemble(&text).unwrap(), original);
    }

    #[test]
    fn assemble_with_comments_and_blanks() {
        let text = "\
; add two numbers
LIT 0 3   ; first

lit 0 4   # second
OPR 0 ADD
SYS 0 WRITE
SYS 0 HALT
";
        let program = assemble(text).unwrap();
        assert_eq!(program.len(), 5);
        assert_eq!(program.instructions[2], Instruction::opr(Opr::Add));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = assemble("LIT 0 1\n\nFOO 0 0\n").unwrap_err();
        assert_eq!(
            err,
            AsmError::UnknownOpcode {
                line: 3,
                token: "FOO".to_string()
            }
        );
    }
}
