//! Tokenizer for PL/0 listings.

use crate::error::AsmError;

/// A single token from a listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A mnemonic. Always uppercase.
    Ident(String),
    /// A signed decimal or hex literal.
    Number(i32),
}

/// Tokenize a single line.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` or `#` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(&[';', '#'][..]) {
        Some(pos) => &line[..pos],
        None => line,
    };

    line.split_whitespace()
        .map(|word| {
            let (negative, digits) = match word.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, word.strip_prefix('+').unwrap_or(word)),
            };
            if !digits.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
                return Ok(Token::Ident(word.to_uppercase()));
            }

            // The sign only goes before the prefix; `from_str_radix` would
            // also take one after it.
            let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                    i64::from_str_radix(hex, 16).ok()
                }
                Some(_) => None,
                None => digits.parse::<i64>().ok(),
            };
            magnitude
                .map(|v| if negative { -v } else { v })
                .and_then(|v| i32::try_from(v).ok())
                .map(Token::Number)
                .ok_or_else(|| AsmError::InvalidNumber {
                    line: line_num,
                    token: word.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![]);
    }

    #[test]
    fn comment_only() {
        assert_eq!(tokenize_line("  ; nothing here", 1).unwrap(), vec![]);
        assert_eq!(tokenize_line("# also nothing", 1).unwrap(), vec![]);
    }

    #[test]
    fn mnemonic_and_numbers() {
        assert_eq!(
            tokenize_line("lit 0 -5 ; push", 1).unwrap(),
            vec![
                Token::Ident("LIT".to_string()),
                Token::Number(0),
                Token::Number(-5),
            ]
        );
    }

    #[test]
    fn numeric_opcode_and_hex() {
        assert_eq!(
            tokenize_line("7 0 0x1e", 1).unwrap(),
            vec![Token::Number(7), Token::Number(0), Token::Number(30)]
        );
    }

    #[test]
    fn sentinel_is_a_number() {
        assert_eq!(tokenize_line("-1 0 0", 1).unwrap()[0], Token::Number(-1));
    }

    #[test]
    fn negative_hex() {
        assert_eq!(tokenize_line("-0x10", 1).unwrap(), vec![Token::Number(-16)]);
    }

    #[test]
    fn rejects_sign_after_hex_prefix() {
        for word in ["0x-5", "-0x-5", "0x+5", "0X-1"] {
            assert_eq!(
                tokenize_line(word, 2),
                Err(AsmError::InvalidNumber {
                    line: 2,
                    token: word.to_string()
                }),
                "{word}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            tokenize_line("LIT 0 99999999999", 6),
            Err(AsmError::InvalidNumber {
                line: 6,
                token: "99999999999".to_string()
            })
        );
    }

    #[test]
    fn rejects_malformed_number() {
        assert!(matches!(
            tokenize_line("JMP 0 12abc", 2),
            Err(AsmError::InvalidNumber { line: 2, .. })
        ));
    }
}
