//! Sentence splitter (spec.md §4.2): turns stripped source text into an
//! ordered sequence of indentation-tagged sentences, respecting quoted
//! strings and bracketed list literals as opaque spans.

use crate::error::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Period,
    Colon,
}

#[derive(Debug, Clone)]
pub struct SentenceToken {
    pub text: String,
    pub indent: usize,
    pub terminator: Terminator,
    pub span: Span,
}

const TAB_WIDTH: usize = 4;

/// Splits `source` into sentence tokens. Tabs are canonicalized to
/// `TAB_WIDTH` spaces before indentation is measured (spec §9).
pub fn split_sentences(source: &str) -> Vec<SentenceToken> {
    let mut sentences = Vec::new();
    let mut depth: i32 = 0; // nesting of quotes/brackets, opaque to terminators
    let mut quote: Option<char> = None;
    let mut current = String::new();
    let mut current_start = 0usize;
    let mut indent = 0usize;
    let mut measuring_indent = true;
    let mut line_col = 0usize;

    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let (byte_pos, c) = chars[i];

        if measuring_indent {
            match c {
                ' ' => {
                    line_col += 1;
                    i += 1;
                    continue;
                }
                '\t' => {
                    line_col += TAB_WIDTH;
                    i += 1;
                    continue;
                }
                '\n' => {
                    // Blank line: reset and keep scanning for the next sentence.
                    line_col = 0;
                    i += 1;
                    continue;
                }
                '\r' => {
                    i += 1;
                    continue;
                }
                _ => {
                    measuring_indent = false;
                    indent = line_col;
                    current_start = byte_pos;
                }
            }
        }

        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = (depth - 1).max(0);
                current.push(c);
            }
            '.' if depth == 0 && is_decimal_point(&chars, i) => {
                current.push(c);
            }
            '.' if depth == 0 => {
                let span = Span::new(current_start, byte_pos + 1);
                emit(&mut sentences, &current, indent, Terminator::Period, span);
                current.clear();
                measuring_indent = true;
                line_col = 0;
            }
            ':' if depth == 0 => {
                let span = Span::new(current_start, byte_pos + 1);
                emit(&mut sentences, &current, indent, Terminator::Colon, span);
                current.clear();
                measuring_indent = true;
                line_col = 0;
            }
            '\n' => {
                // Newline mid-sentence (no terminator yet): keep as whitespace.
                current.push(' ');
            }
            _ => current.push(c),
        }
        i += 1;
    }

    sentences
}

/// A `.` is part of a decimal literal, not a sentence terminator, when it
/// sits directly between two digits (`2.5`), not at a genuine sentence
/// boundary (`Set x to 5.`, where a space precedes the period's sentence).
fn is_decimal_point(chars: &[(usize, char)], i: usize) -> bool {
    let prev_digit = i > 0 && chars[i - 1].1.is_ascii_digit();
    let next_digit = chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit());
    prev_digit && next_digit
}

fn emit(
    out: &mut Vec<SentenceToken>,
    text: &str,
    indent: usize,
    terminator: Terminator,
    span: Span,
) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    out.push(SentenceToken {
        text: trimmed.to_string(),
        indent,
        terminator,
        span,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_period() {
        let toks = split_sentences("Set x to 5. Display x.");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].text, "Set x to 5");
        assert_eq!(toks[0].terminator, Terminator::Period);
        assert_eq!(toks[1].text, "Display x");
    }

    #[test]
    fn colon_opens_a_block_and_tracks_indent() {
        let src = "While x is greater than 0:\n    Display x.\n    Decrement x.\n";
        let toks = split_sentences(src);
        assert_eq!(toks[0].terminator, Terminator::Colon);
        assert_eq!(toks[0].indent, 0);
        assert_eq!(toks[1].indent, 4);
        assert_eq!(toks[2].indent, 4);
    }

    #[test]
    fn tabs_canonicalize_to_four_spaces() {
        let src = "While true:\n\tDisplay 1.\n";
        let toks = split_sentences(src);
        assert_eq!(toks[1].indent, 4);
    }

    #[test]
    fn period_inside_string_literal_does_not_split() {
        let toks = split_sentences(r#"Display "Hello. World."."#);
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].text, "Display \"Hello. World.\"");
    }

    #[test]
    fn decimal_point_does_not_split_a_sentence() {
        let toks = split_sentences("Set x to 2.5. Display x.");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].text, "Set x to 2.5");
    }

    #[test]
    fn period_inside_list_literal_does_not_split() {
        let toks = split_sentences("Create a list called xs with values [1, 2.5, 3].");
        assert_eq!(toks.len(), 1);
    }
}
