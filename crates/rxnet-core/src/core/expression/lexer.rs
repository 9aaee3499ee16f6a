use super::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length in bytes of the numeric literal starting at `start`, or 0 if none.
///
/// Accepts `12`, `1.5`, `.5`, `3.`, `1e-3` and `2.5E+4`. An exponent marker
/// that is not followed by digits is left for the caller (so `2e` lexes as
/// `2` followed by the identifier `e`).
fn number_len(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i - start
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, ExpressionError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = text[i..].chars().next().unwrap_or_default();
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }

        let single = match c {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '/' => Some(TokenKind::Slash),
            '^' => Some(TokenKind::Caret),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token { kind, position: i });
            i += 1;
            continue;
        }

        if c == '*' {
            // `**` is accepted as a synonym for `^`.
            if bytes.get(i + 1) == Some(&b'*') {
                tokens.push(Token {
                    kind: TokenKind::Caret,
                    position: i,
                });
                i += 2;
            } else {
                tokens.push(Token {
                    kind: TokenKind::Star,
                    position: i,
                });
                i += 1;
            }
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let len = number_len(bytes, i);
            if len == 0 {
                return Err(ExpressionError::UnexpectedCharacter {
                    character: c,
                    position: i,
                });
            }
            let literal = &text[i..i + len];
            let value: f64 = literal
                .parse()
                .map_err(|_| ExpressionError::InvalidNumber(literal.to_string()))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position: i,
            });
            i += len;
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i] as char) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(text[start..i].to_string()),
                position: start,
            });
            continue;
        }

        return Err(ExpressionError::UnexpectedCharacter {
            character: c,
            position: i,
        });
    }

    Ok(tokens)
}

/// Scans `text` for identifier runs, skipping numeric literals and any
/// character the tokenizer would reject. Never fails.
pub(crate) fn scan_identifiers(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = text[i..].chars().next().unwrap_or_default();
        if c.is_ascii_digit() || (c == '.' && number_len(bytes, i) > 0) {
            i += number_len(bytes, i).max(1);
        } else if is_ident_start(c) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i] as char) {
                i += 1;
            }
            found.push((start, &text[start..i]));
        } else {
            i += c.len_utf8();
        }
    }

    found
}
