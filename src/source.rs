//! Source reader: UTF-8 loading, comment stripping, `Include` resolution
//! (spec.md §4.1).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ParseFailure, Span, VyraError};

/// Loads `path` and returns fully comment-stripped, include-expanded
/// source text ready for the sentence splitter.
pub fn load_program(path: &Path) -> Result<String, VyraError> {
    let mut including = HashSet::new();
    load_file(path, &mut including)
}

fn load_file(path: &Path, including: &mut HashSet<PathBuf>) -> Result<String, VyraError> {
    let canonical = canonicalize_best_effort(path);
    if !including.insert(canonical.clone()) {
        return Err(VyraError::Parse {
            span: Span::EMPTY,
            detail: ParseFailure::IncludeCycle { path: path.display().to_string() },
        });
    }

    let raw = fs::read_to_string(path).map_err(|e| VyraError::Io {
        message: format!("failed to read `{}`: {}", path.display(), e),
    })?;

    let stripped = strip_comments(&raw);
    let expanded = resolve_includes(&stripped, path, including)?;

    including.remove(&canonical);
    Ok(expanded)
}

fn canonicalize_best_effort(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Strips `#...` line comments and `Note: ...` sentences, leaving quoted
/// strings and list literals opaque (spec §4.1, §9 open question: `#`
/// inside a string is never a comment).
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();
    let mut in_string: Option<char> = None;
    let mut at_line_start = true;

    while let Some((_, c)) = chars.next() {
        if let Some(quote) = in_string {
            out.push(c);
            if c == quote {
                in_string = None;
            }
            at_line_start = false;
            continue;
        }

        if c == '"' || c == '\'' {
            in_string = Some(c);
            out.push(c);
            at_line_start = false;
            continue;
        }

        if c == '#' {
            // Line comment: skip to end of line, keep the newline.
            for (_, c2) in chars.by_ref() {
                if c2 == '\n' {
                    out.push('\n');
                    at_line_start = true;
                    break;
                }
            }
            continue;
        }

        if at_line_start && starts_with_note(source, &mut chars, c) {
            // Skip to the next sentence terminator ('.' or ':') outside quotes.
            skip_note_sentence(&mut chars);
            continue;
        }

        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
        out.push(c);
    }
    out
}

/// Peeks ahead (without consuming on a non-match) to see whether the
/// cursor sits at the case-insensitive token `Note:`.
fn starts_with_note(
    source: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices>,
    first: char,
) -> bool {
    if !first.eq_ignore_ascii_case(&'n') {
        return false;
    }
    let rest = "ote:";
    let mut lookahead = chars.clone();
    for expect in rest.chars() {
        match lookahead.peek() {
            Some((_, c)) if c.eq_ignore_ascii_case(&expect) => {
                lookahead.next();
            }
            _ => return false,
        }
    }
    let _ = source;
    *chars = lookahead;
    true
}

fn skip_note_sentence(chars: &mut std::iter::Peekable<std::str::CharIndices>) {
    let mut in_string: Option<char> = None;
    for (_, c) in chars.by_ref() {
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '.' | ':' => break,
            _ => {}
        }
    }
}

/// Replaces `Include "path".` directives with the (recursively stripped)
/// contents of the named file, resolved relative to `including_file`.
fn resolve_includes(
    source: &str,
    including_file: &Path,
    including: &mut HashSet<PathBuf>,
) -> Result<String, VyraError> {
    let base_dir = including_file.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    loop {
        let Some(pos) = find_include_directive(rest) else {
            out.push_str(rest);
            break;
        };
        let (before, directive_path, after) = pos;
        out.push_str(before);

        let included_path = base_dir.join(&directive_path);
        if !included_path.exists() {
            return Err(VyraError::Parse {
                span: Span::EMPTY,
                detail: ParseFailure::IncludeMissing { path: directive_path },
            });
        }
        let included_text = load_file(&included_path, including)?;
        out.push_str(&included_text);
        out.push('\n');
        rest = after;
    }

    Ok(out)
}

/// Finds the next `Include "path".` directive, returning the text before
/// it, the quoted path, and the remaining text after the directive.
fn find_include_directive(source: &str) -> Option<(&str, String, &str)> {
    let re = INCLUDE_RE.with(|re| re.clone());
    let caps = re.captures(source)?;
    let whole = caps.get(0)?;
    let path = caps.get(1)?.as_str().to_string();
    Some((&source[..whole.start()], path, &source[whole.end()..]))
}

thread_local! {
    static INCLUDE_RE: regex::Regex = regex::Regex::new(
        r#"(?i)Include\s+"([^"]+)"\s*\."#
    ).expect("static include regex is valid");
}
