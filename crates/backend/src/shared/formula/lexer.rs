use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
    Eof,
}

/// Токен и его позиция (байтовое смещение) в исходной строке
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub(super) fn tokenize(src: &str) -> Result<Vec<Spanned>, FormulaError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    let err = |pos: usize, message: String| FormulaError::Syntax {
        formula: src.to_string(),
        position: pos,
        message,
    };

    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next_is_digit(bytes, i)) {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let text = &src[start..i];
            let value = text
                .parse::<f64>()
                .map_err(|_| err(start, format!("invalid number '{}'", text)))?;
            tokens.push(Spanned {
                token: Token::Num(value),
                pos: start,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(src[start..i].to_string()),
                pos: start,
            });
            continue;
        }

        let peek = |offset: usize| bytes.get(i + offset).copied();
        let (token, len) = match c {
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' => (Token::Star, 1),
            '/' => (Token::Slash, 1),
            '%' => (Token::Percent, 1),
            '^' => (Token::Caret, 1),
            '?' => (Token::Question, 1),
            ':' => (Token::Colon, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            ',' | ';' => (Token::Comma, 1),
            '<' if peek(1) == Some(b'=') => (Token::Le, 2),
            '<' => (Token::Lt, 1),
            '>' if peek(1) == Some(b'=') => (Token::Ge, 2),
            '>' => (Token::Gt, 1),
            '=' if peek(1) == Some(b'=') && peek(2) == Some(b'=') => (Token::EqEq, 3),
            '=' if peek(1) == Some(b'=') => (Token::EqEq, 2),
            '!' if peek(1) == Some(b'=') && peek(2) == Some(b'=') => (Token::NotEq, 3),
            '!' if peek(1) == Some(b'=') => (Token::NotEq, 2),
            '!' => (Token::Bang, 1),
            '&' if peek(1) == Some(b'&') => (Token::AndAnd, 2),
            '|' if peek(1) == Some(b'|') => (Token::OrOr, 2),
            other => return Err(err(start, format!("unexpected character '{}'", other))),
        };
        tokens.push(Spanned { token, pos: start });
        i += len;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: src.len(),
    });
    Ok(tokens)
}

fn next_is_digit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit())
}
