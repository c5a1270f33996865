//! Tokenizer for the expression sub-language (spec.md §3 Expression AST).
//! Sentence-level patterns are matched by the parser's regex table; once a
//! pattern captures a trailing expression substring (the `Y` in `Set X to
//! Y`), this lexer turns it into tokens for the recursive-descent
//! expression parser in `parser::expr`.

use crate::error::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Text(String),
    Ident(String),
    True,
    False,
    Nothing,
    And,
    Or,
    Not,
    FollowedBy,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Multi-word English phrases that lex as a single operator token,
/// longest phrase first so `is not equal to` isn't shadowed by `is not`.
const WORD_PHRASES: &[(&[&str], TokenKind)] = &[
    (&["is", "greater", "than", "or", "equal", "to"], TokenKind::GtEq),
    (&["is", "less", "than", "or", "equal", "to"], TokenKind::LtEq),
    (&["is", "not", "equal", "to"], TokenKind::NotEq),
    (&["is", "greater", "than"], TokenKind::Gt),
    (&["is", "less", "than"], TokenKind::Lt),
    (&["is", "equal", "to"], TokenKind::Eq),
    (&["is", "not"], TokenKind::NotEq),
    (&["is"], TokenKind::Eq),
    (&["divided", "by"], TokenKind::Slash),
    (&["followed", "by"], TokenKind::FollowedBy),
    (&["times"], TokenKind::Star),
    (&["plus"], TokenKind::Plus),
    (&["minus"], TokenKind::Minus),
];

pub fn tokenize(text: &str, base_offset: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let start = pos;
            i += 1;
            let mut s = String::new();
            while i < chars.len() && chars[i].1 != quote {
                s.push(chars[i].1);
                i += 1;
            }
            let end = chars.get(i).map(|(p, _)| p + 1).unwrap_or(text.len());
            i += 1;
            tokens.push(Token {
                kind: TokenKind::Text(s),
                span: Span::new(base_offset + start, base_offset + end),
            });
            continue;
        }

        if c.is_ascii_digit() {
            let start = pos;
            let mut end = pos + c.len_utf8();
            let mut is_float = false;
            i += 1;
            while i < chars.len() {
                let (p, c2) = chars[i];
                if c2.is_ascii_digit() {
                    end = p + c2.len_utf8();
                    i += 1;
                } else if c2 == '.'
                    && !is_float
                    && chars.get(i + 1).is_some_and(|(_, n)| n.is_ascii_digit())
                {
                    is_float = true;
                    end = p + c2.len_utf8();
                    i += 1;
                } else {
                    break;
                }
            }
            let lexeme = &text[start..end];
            let kind = if is_float {
                TokenKind::Float(lexeme.parse().unwrap_or(0.0))
            } else {
                TokenKind::Int(lexeme.parse().unwrap_or(0))
            };
            tokens.push(Token { kind, span: Span::new(base_offset + start, base_offset + end) });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            if let Some((kind, span, consumed_words)) = try_word_phrase(&chars, i, text, base_offset) {
                tokens.push(Token { kind, span });
                i = consumed_words;
                continue;
            }

            let start = pos;
            let mut end = pos + c.len_utf8();
            i += 1;
            while i < chars.len() {
                let (p, c2) = chars[i];
                if c2.is_alphanumeric() || c2 == '_' {
                    end = p + c2.len_utf8();
                    i += 1;
                } else {
                    break;
                }
            }
            let word = &text[start..end];
            let span = Span::new(base_offset + start, base_offset + end);
            let kind = match word.to_ascii_lowercase().as_str() {
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "nothing" | "none" | "absent" => TokenKind::Nothing,
                _ => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token { kind, span });
            continue;
        }

        let start = pos;
        match c {
            '+' => tokens.push(tok(TokenKind::Plus, base_offset, start, 1)),
            '-' => tokens.push(tok(TokenKind::Minus, base_offset, start, 1)),
            '*' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('*') {
                    tokens.push(tok(TokenKind::StarStar, base_offset, start, 2));
                    i += 1;
                } else {
                    tokens.push(tok(TokenKind::Star, base_offset, start, 1));
                }
            }
            '/' => tokens.push(tok(TokenKind::Slash, base_offset, start, 1)),
            '%' => tokens.push(tok(TokenKind::Percent, base_offset, start, 1)),
            '(' => tokens.push(tok(TokenKind::LParen, base_offset, start, 1)),
            ')' => tokens.push(tok(TokenKind::RParen, base_offset, start, 1)),
            '[' => tokens.push(tok(TokenKind::LBracket, base_offset, start, 1)),
            ']' => tokens.push(tok(TokenKind::RBracket, base_offset, start, 1)),
            ',' => tokens.push(tok(TokenKind::Comma, base_offset, start, 1)),
            '=' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('=') {
                    tokens.push(tok(TokenKind::Eq, base_offset, start, 2));
                    i += 1;
                } else {
                    tokens.push(tok(TokenKind::Eq, base_offset, start, 1));
                }
            }
            '!' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('=') {
                    tokens.push(tok(TokenKind::NotEq, base_offset, start, 2));
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('=') {
                    tokens.push(tok(TokenKind::LtEq, base_offset, start, 2));
                    i += 1;
                } else {
                    tokens.push(tok(TokenKind::Lt, base_offset, start, 1));
                }
            }
            '>' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('=') {
                    tokens.push(tok(TokenKind::GtEq, base_offset, start, 2));
                    i += 1;
                } else {
                    tokens.push(tok(TokenKind::Gt, base_offset, start, 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(base_offset + text.len(), base_offset + text.len()),
    });
    tokens
}

/// Attempts to match one of `WORD_PHRASES` starting at word-index `i`.
/// Returns the token, its span, and the char-index to resume lexing from.
fn try_word_phrase(
    chars: &[(usize, char)],
    i: usize,
    text: &str,
    base_offset: usize,
) -> Option<(TokenKind, Span, usize)> {
    'phrase: for (words, kind) in WORD_PHRASES {
        let mut cursor = i;
        let start_byte = chars[i].0;
        let mut end_byte = start_byte;
        for (word_idx, expect) in words.iter().enumerate() {
            if word_idx > 0 {
                // Skip whitespace between words; require at least one word boundary.
                if cursor >= chars.len() || !chars[cursor].1.is_whitespace() {
                    continue 'phrase;
                }
                while cursor < chars.len() && chars[cursor].1.is_whitespace() {
                    cursor += 1;
                }
            }
            let Some((word, next_cursor, word_end)) = read_word(chars, cursor, text) else {
                continue 'phrase;
            };
            if !word.eq_ignore_ascii_case(expect) {
                continue 'phrase;
            }
            cursor = next_cursor;
            end_byte = word_end;
        }
        return Some((kind.clone(), Span::new(base_offset + start_byte, base_offset + end_byte), cursor));
    }
    None
}

fn read_word<'a>(chars: &[(usize, char)], start: usize, text: &'a str) -> Option<(&'a str, usize, usize)> {
    if start >= chars.len() || !(chars[start].1.is_alphabetic() || chars[start].1 == '_') {
        return None;
    }
    let start_byte = chars[start].0;
    let mut cursor = start;
    let mut end_byte = start_byte + chars[start].1.len_utf8();
    cursor += 1;
    while cursor < chars.len() && (chars[cursor].1.is_alphanumeric() || chars[cursor].1 == '_') {
        end_byte = chars[cursor].0 + chars[cursor].1.len_utf8();
        cursor += 1;
    }
    Some((&text[start_byte..end_byte], cursor, end_byte))
}

fn tok(kind: TokenKind, base_offset: usize, start: usize, len: usize) -> Token {
    Token { kind, span: Span::new(base_offset + start, base_offset + start + len) }
}
