//! Parser for listing tokens → instructions.
//!
//! Every instruction line has the form `<op> <l> <m>`. `<op>` is a mnemonic
//! or a raw opcode number; for OPR and SYS, `<m>` may also be the
//! sub-operation mnemonic (`OPR 0 ADD`, `SYS 0 HALT`).

use crate::error::AsmError;
use crate::lexer::Token;
use pl0vm_common::opcode::ALL_OPRS;
use pl0vm_common::{Instruction, Opcode, Sys, SENTINEL_OPCODE};

/// Result of parsing a single listing line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line {
    Instr(Instruction),
    /// The `-1` sentinel: the listing ends here.
    End,
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Ident(s) => s.clone(),
        Token::Number(n) => n.to_string(),
    }
}

/// Resolve a symbolic `m` operand for the families that have sub-operations.
fn lookup_sub_operation(opcode: i32, name: &str) -> Option<i32> {
    if opcode == Opcode::Opr as i32 {
        ALL_OPRS
            .iter()
            .find(|opr| opr.mnemonic() == name)
            .map(|&opr| opr as i32)
    } else if opcode == Opcode::Sys as i32 {
        [Sys::Write, Sys::Read, Sys::Halt]
            .into_iter()
            .find(|sys| sys.mnemonic() == name)
            .map(|sys| sys as i32)
    } else {
        None
    }
}

/// Parse the tokens of one line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Line>, AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let opcode = match first {
        Token::Number(n) if *n == SENTINEL_OPCODE => return Ok(Some(Line::End)),
        Token::Number(n) => *n,
        Token::Ident(s) => Opcode::from_mnemonic(s).ok_or_else(|| AsmError::UnknownOpcode {
            line: line_num,
            token: s.clone(),
        })? as i32,
    };

    let missing = || AsmError::MissingArgument {
        line: line_num,
        opcode: token_text(first),
    };

    let l = match tokens.get(1).ok_or_else(missing)? {
        Token::Number(n) => *n,
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: token_text(other),
            })
        }
    };

    let m = match tokens.get(2).ok_or_else(missing)? {
        Token::Number(n) => *n,
        Token::Ident(name) => {
            lookup_sub_operation(opcode, name).ok_or_else(|| AsmError::UnknownOpcode {
                line: line_num,
                token: name.clone(),
            })?
        }
    };

    expect_end(&tokens[3..], line_num)?;
    Ok(Some(Line::Instr(Instruction::new(opcode, l, m))))
}

fn expect_end(remaining: &[Token], line: usize) -> Result<(), AsmError> {
    if let Some(tok) = remaining.first() {
        return Err(AsmError::UnexpectedToken {
            line,
            token: token_text(tok),
        });
    }
    Ok(())
}
