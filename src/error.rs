//! Crate-wide error taxonomy and source-span pretty printing.
//!
//! Mirrors the way the original transpiler reported errors: a `Span` into
//! the original source text, a `{:?}`-derived kind label, and a
//! hand-rolled underline rather than a derive-macro error crate.

use std::fmt;

/// A half-open byte range into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const EMPTY: Span = Span { start: 0, end: 0 };
}

/// The complete error taxonomy of spec.md §7, one variant per kind.
#[derive(Debug, Clone)]
pub enum VyraError {
    Parse { span: Span, detail: ParseFailure },
    Name { span: Span, identifier: String },
    Type { span: Span, message: String },
    Arity { span: Span, function: String, expected: usize, found: usize },
    DivisionByZero { span: Span },
    Index { span: Span, index: i64, len: usize },
    IterationLimitExceeded { span: Span, limit: u64 },
    Io { message: String },
    AiRewrite { message: String },
}

/// Sub-kinds of `VyraError::Parse`, matching spec.md §4.3.
#[derive(Debug, Clone)]
pub enum ParseFailure {
    UnknownSentence { text: String },
    UnbalancedBlocks,
    MalformedExpression { message: String },
    UnexpectedToken { expected: String, found: String },
    IncludeCycle { path: String },
    IncludeMissing { path: String },
    LoopControlOutsideLoop { keyword: String },
}

impl VyraError {
    /// Exit code per spec.md §6/§7.
    pub fn exit_code(&self) -> i32 {
        match self {
            VyraError::Parse { .. } => 2,
            VyraError::Io { .. } => 3,
            VyraError::AiRewrite { .. } => 4,
            VyraError::Name { .. }
            | VyraError::Type { .. }
            | VyraError::Arity { .. }
            | VyraError::DivisionByZero { .. }
            | VyraError::Index { .. }
            | VyraError::IterationLimitExceeded { .. } => 1,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            VyraError::Parse { span, .. }
            | VyraError::Name { span, .. }
            | VyraError::Type { span, .. }
            | VyraError::Arity { span, .. }
            | VyraError::DivisionByZero { span }
            | VyraError::Index { span, .. }
            | VyraError::IterationLimitExceeded { span, .. } => Some(*span),
            VyraError::Io { .. } | VyraError::AiRewrite { .. } => None,
        }
    }

    /// Render with an underlined excerpt of `source`, the way the
    /// original parser surfaced failures to the terminal.
    pub fn display_with_source(&self, source: &str) -> String {
        let Some(span) = self.span() else {
            return format!("error: {}", self);
        };
        let (line_num, line_start, line_content) = find_context(source, span.start);
        let col = span.start.saturating_sub(line_start);
        let len = (span.end.max(span.start + 1) - span.start).max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

        format!(
            "error: {}\n\n{:>4} | {}\n     | {}",
            self, line_num, line_content, underline
        )
    }
}

fn find_context(source: &str, pos: usize) -> (usize, usize, &str) {
    let mut line_num = 1;
    let mut line_start = 0;
    for (i, c) in source.char_indices() {
        if i >= pos {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|off| line_start + off)
        .unwrap_or(source.len());
    (line_num, line_start, &source[line_start..line_end])
}

impl fmt::Display for VyraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VyraError::Parse { detail, .. } => match detail {
                ParseFailure::UnknownSentence { text } => {
                    write!(f, "UnknownSentence: could not match sentence `{}`", text)
                }
                ParseFailure::UnbalancedBlocks => write!(f, "UnbalancedBlocks"),
                ParseFailure::MalformedExpression { message } => {
                    write!(f, "MalformedExpression: {}", message)
                }
                ParseFailure::UnexpectedToken { expected, found } => {
                    write!(f, "UnexpectedToken: expected {}, found {}", expected, found)
                }
                ParseFailure::IncludeCycle { path } => {
                    write!(f, "IncludeCycle: `{}` includes itself", path)
                }
                ParseFailure::IncludeMissing { path } => {
                    write!(f, "IncludeMissing: `{}` not found", path)
                }
                ParseFailure::LoopControlOutsideLoop { keyword } => {
                    write!(f, "UnexpectedToken: `{}` outside a loop body", keyword)
                }
            },
            VyraError::Name { identifier, .. } => {
                write!(f, "NameError: `{}` is not in scope", identifier)
            }
            VyraError::Type { message, .. } => write!(f, "TypeError: {}", message),
            VyraError::Arity { function, expected, found, .. } => write!(
                f,
                "ArityError: `{}` expects {} argument(s), got {}",
                function, expected, found
            ),
            VyraError::DivisionByZero { .. } => write!(f, "DivisionByZero"),
            VyraError::Index { index, len, .. } => {
                write!(f, "IndexError: index {} out of range for length {}", index, len)
            }
            VyraError::IterationLimitExceeded { limit, .. } => {
                write!(f, "IterationLimitExceeded: exceeded {} iterations", limit)
            }
            VyraError::Io { message } => write!(f, "IOError: {}", message),
            VyraError::AiRewrite { message } => write!(f, "AIRewriteError: {}", message),
        }
    }
}

impl std::error::Error for VyraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec_table() {
        assert_eq!(
            VyraError::Parse { span: Span::EMPTY, detail: ParseFailure::UnbalancedBlocks }.exit_code(),
            2
        );
        assert_eq!(VyraError::Io { message: "x".into() }.exit_code(), 3);
        assert_eq!(VyraError::AiRewrite { message: "x".into() }.exit_code(), 4);
        assert_eq!(VyraError::DivisionByZero { span: Span::EMPTY }.exit_code(), 1);
    }

    #[test]
    fn display_with_source_underlines_the_span() {
        let src = "Set x to 1.\nDivide x by 0 and store in y.\n";
        let err = VyraError::DivisionByZero { span: Span::new(19, 20) };
        let rendered = err.display_with_source(src);
        assert!(rendered.contains("DivisionByZero"));
        assert!(rendered.contains("Divide x by 0"));
    }
}
