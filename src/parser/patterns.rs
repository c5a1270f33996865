//! The ordered pattern table (spec.md §4.3, §9): an immutable sequence of
//! `(regex, constructor)` pairs tried in order, first match wins. Each
//! constructor extracts plain-text captures into a `RawStmt`; turning those
//! captures into real `Expr`/`Stmt` nodes (which needs the arena and the
//! interner) happens one layer up, in `parser::build`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseFailure, Span, VyraError};

/// A statement or block-header recognized from one sentence's text, still
/// carrying its operand substrings as raw text (to be expression-parsed
/// later, once we know the declared-list set).
#[derive(Debug, Clone)]
pub enum RawStmt {
    Assign { target: String, expr: String },
    ArithToTarget { op: char, a: String, b: String, target: String },
    AddAmbiguous { amount: String, target: String },
    SubtractInPlace { amount: String, target: String },
    MultiplyInPlace { amount: String, target: String },
    DivideInPlace { amount: String, target: String },
    Increment { target: String },
    Decrement { target: String },
    Display { expr: String },
    AskText { target: String, prompt: Option<String> },
    AskNumber { target: String },
    ListCreateEmpty { target: String },
    ListCreateWithValues { target: String, values: String },
    Break,
    Continue,
    CallStmt { name: String, args: String, result: Option<String> },
    Return { expr: Option<String> },
    ReadFile { path: String, target: String },
    WriteFile { value: String, path: String },

    If { cond: String },
    OtherwiseIf { cond: String },
    Otherwise,
    While { cond: String },
    Repeat { count: String },
    ForEach { var: String, iterable: String },
    FunctionDef { name: String, params: String },

    InlineIf { cond: String, then_text: String },
    InlineOtherwiseIf { cond: String, then_text: String },
    InlineOtherwise { text: String },
}

macro_rules! re {
    ($pat:expr) => {
        Lazy::new(|| Regex::new($pat).expect("static pattern-table regex is valid"))
    };
}

static RE_ASSIGN: Lazy<Regex> = re!(r"(?i)^(?:Set|Store|Save)\s+(\w+)\s+(?:to|as)\s+(.+)$");
static RE_ASSIGN_CREATE_VAR: Lazy<Regex> =
    re!(r#"(?i)^Create a variable called (\w+) with value (.+)$"#);
static RE_LIST_EMPTY: Lazy<Regex> = re!(r"(?i)^Create an empty list called (\w+)$");
static RE_LIST_WITH_VALUES: Lazy<Regex> =
    re!(r"(?i)^Create a list called (\w+) with values \[(.*)\]$");
static RE_FUNC_DEF: Lazy<Regex> = re!(
    r"(?i)^(?:Create function|Define function)\s+(\w+)\s+(?:that takes|with parameters)\s+(.+)$"
);
static RE_ARITH_TO_TARGET: Lazy<Regex> = re!(
    r"(?i)^(Add|Subtract|Multiply|Divide)\s+(.+?)\s+and\s+(.+?)\s+and store the result in\s+(\w+)$"
);
// `Add X to Y` / `Subtract X from Y` / `Multiply|Divide Y by X`, but naming a
// target distinct from the variable being read, e.g. `Divide x by 0 and
// store in y`. Tried before the bare in-place forms below so their greedy
// amount capture never swallows the `and store (the result) in` suffix.
static RE_ADD_TO_TARGET: Lazy<Regex> =
    re!(r"(?i)^Add\s+(.+?)\s+to\s+(\w+)\s+and store(?: the result)? in\s+(\w+)$");
static RE_SUBTRACT_TO_TARGET: Lazy<Regex> =
    re!(r"(?i)^Subtract\s+(.+?)\s+from\s+(\w+)\s+and store(?: the result)? in\s+(\w+)$");
static RE_MULTIPLY_TO_TARGET: Lazy<Regex> =
    re!(r"(?i)^Multiply\s+(\w+)\s+by\s+(.+?)\s+and store(?: the result)? in\s+(\w+)$");
static RE_DIVIDE_TO_TARGET: Lazy<Regex> =
    re!(r"(?i)^Divide\s+(\w+)\s+by\s+(.+?)\s+and store(?: the result)? in\s+(\w+)$");
static RE_INCREMENT: Lazy<Regex> = re!(r"(?i)^Increment\s+(\w+)$");
static RE_DECREMENT: Lazy<Regex> = re!(r"(?i)^Decrement\s+(\w+)$");
static RE_ADD_AMBIGUOUS: Lazy<Regex> = re!(r"(?i)^Add\s+(.+)\s+to\s+(\w+)$");
static RE_SUBTRACT_IN_PLACE: Lazy<Regex> = re!(r"(?i)^Subtract\s+(.+)\s+from\s+(\w+)$");
static RE_MULTIPLY_IN_PLACE: Lazy<Regex> = re!(r"(?i)^Multiply\s+(\w+)\s+by\s+(.+)$");
static RE_DIVIDE_IN_PLACE: Lazy<Regex> = re!(r"(?i)^Divide\s+(\w+)\s+by\s+(.+)$");
static RE_OUTPUT: Lazy<Regex> = re!(r"(?i)^(?:Display|Show|Print|Say)\s+(.+)$");
static RE_ASK_TEXT_NAMED: Lazy<Regex> =
    re!(r#"(?i)^Ask the user for (?:.+?)\s+called\s+(\w+)$"#);
static RE_ASK_TEXT_PROMPT: Lazy<Regex> =
    re!(r#"(?i)^Ask the user "(.+)" and store (?:it|the answer) in\s+(\w+)$"#);
static RE_ASK_NUMBER: Lazy<Regex> =
    re!(r"(?i)^Get a number from the user and store it in\s+(\w+)$");
static RE_INLINE_IF: Lazy<Regex> = re!(r"(?i)^If\s+(.+?),\s*(.+)$");
static RE_IF: Lazy<Regex> = re!(r"(?i)^If\s+(.+)$");
static RE_INLINE_OTHERWISE_IF: Lazy<Regex> = re!(r"(?i)^Otherwise if\s+(.+?),\s*(.+)$");
static RE_OTHERWISE_IF: Lazy<Regex> = re!(r"(?i)^Otherwise if\s+(.+)$");
static RE_INLINE_OTHERWISE: Lazy<Regex> = re!(r"(?i)^Otherwise\s+(.+)$");
static RE_OTHERWISE: Lazy<Regex> = re!(r"(?i)^Otherwise$");
static RE_WHILE: Lazy<Regex> = re!(r"(?i)^While\s+(.+)$");
static RE_REPEAT: Lazy<Regex> = re!(r"(?i)^Repeat\s+(.+)\s+times$");
static RE_FOR_EACH: Lazy<Regex> = re!(r"(?i)^For each\s+(\w+)\s+in\s+(.+)$");
static RE_BREAK: Lazy<Regex> = re!(r"(?i)^Stop the loop$");
static RE_CONTINUE: Lazy<Regex> = re!(r"(?i)^Continue to next iteration$");
static RE_CALL: Lazy<Regex> =
    re!(r"(?i)^Call\s+(\w+)(?:\s+with\s+(.+?))?(?:\s+and store in\s+(\w+))?$");
static RE_RETURN: Lazy<Regex> = re!(r"(?i)^Return(?:\s+(.+))?$");
static RE_READ_FILE: Lazy<Regex> = re!(r"(?i)^Read file\s+(.+)\s+into\s+(\w+)$");
static RE_WRITE_FILE: Lazy<Regex> = re!(r"(?i)^Write\s+(.+)\s+to file\s+(.+)$");

/// Matches `text` against the ordered pattern table, returning the first
/// hit. Order is load-bearing: more specific patterns (arith-to-target,
/// inline-if, list creation) precede the more general ones they would
/// otherwise be swallowed by.
pub fn match_sentence(text: &str, span: Span) -> Result<RawStmt, VyraError> {
    let text = text.trim();

    if let Some(c) = RE_ASSIGN.captures(text) {
        return Ok(RawStmt::Assign { target: c[1].to_string(), expr: c[2].to_string() });
    }
    if let Some(c) = RE_ASSIGN_CREATE_VAR.captures(text) {
        return Ok(RawStmt::Assign { target: c[1].to_string(), expr: c[2].to_string() });
    }
    if let Some(c) = RE_LIST_EMPTY.captures(text) {
        return Ok(RawStmt::ListCreateEmpty { target: c[1].to_string() });
    }
    if let Some(c) = RE_LIST_WITH_VALUES.captures(text) {
        return Ok(RawStmt::ListCreateWithValues {
            target: c[1].to_string(),
            values: c[2].to_string(),
        });
    }
    if let Some(c) = RE_FUNC_DEF.captures(text) {
        return Ok(RawStmt::FunctionDef { name: c[1].to_string(), params: c[2].to_string() });
    }
    if let Some(c) = RE_ARITH_TO_TARGET.captures(text) {
        let op = match &c[1].to_ascii_lowercase()[..] {
            "add" => '+',
            "subtract" => '-',
            "multiply" => '*',
            "divide" => '/',
            _ => unreachable!(),
        };
        return Ok(RawStmt::ArithToTarget {
            op,
            a: c[2].to_string(),
            b: c[3].to_string(),
            target: c[4].to_string(),
        });
    }
    if let Some(c) = RE_ADD_TO_TARGET.captures(text) {
        return Ok(RawStmt::ArithToTarget {
            op: '+',
            a: c[2].to_string(),
            b: c[1].to_string(),
            target: c[3].to_string(),
        });
    }
    if let Some(c) = RE_SUBTRACT_TO_TARGET.captures(text) {
        return Ok(RawStmt::ArithToTarget {
            op: '-',
            a: c[2].to_string(),
            b: c[1].to_string(),
            target: c[3].to_string(),
        });
    }
    if let Some(c) = RE_MULTIPLY_TO_TARGET.captures(text) {
        return Ok(RawStmt::ArithToTarget {
            op: '*',
            a: c[1].to_string(),
            b: c[2].to_string(),
            target: c[3].to_string(),
        });
    }
    if let Some(c) = RE_DIVIDE_TO_TARGET.captures(text) {
        return Ok(RawStmt::ArithToTarget {
            op: '/',
            a: c[1].to_string(),
            b: c[2].to_string(),
            target: c[3].to_string(),
        });
    }
    if let Some(c) = RE_INCREMENT.captures(text) {
        return Ok(RawStmt::Increment { target: c[1].to_string() });
    }
    if let Some(c) = RE_DECREMENT.captures(text) {
        return Ok(RawStmt::Decrement { target: c[1].to_string() });
    }
    if let Some(c) = RE_SUBTRACT_IN_PLACE.captures(text) {
        return Ok(RawStmt::SubtractInPlace { amount: c[1].to_string(), target: c[2].to_string() });
    }
    if let Some(c) = RE_MULTIPLY_IN_PLACE.captures(text) {
        return Ok(RawStmt::MultiplyInPlace { target: c[1].to_string(), amount: c[2].to_string() });
    }
    if let Some(c) = RE_DIVIDE_IN_PLACE.captures(text) {
        return Ok(RawStmt::DivideInPlace { target: c[1].to_string(), amount: c[2].to_string() });
    }
    // `Add X to Y` is checked after the unambiguous arithmetic forms so
    // `Add X and Y and store the result in Z` never falls through to here.
    if let Some(c) = RE_ADD_AMBIGUOUS.captures(text) {
        return Ok(RawStmt::AddAmbiguous { amount: c[1].to_string(), target: c[2].to_string() });
    }
    if let Some(c) = RE_ASK_TEXT_PROMPT.captures(text) {
        return Ok(RawStmt::AskText { target: c[2].to_string(), prompt: Some(c[1].to_string()) });
    }
    if let Some(c) = RE_ASK_TEXT_NAMED.captures(text) {
        return Ok(RawStmt::AskText { target: c[1].to_string(), prompt: None });
    }
    if let Some(c) = RE_ASK_NUMBER.captures(text) {
        return Ok(RawStmt::AskNumber { target: c[1].to_string() });
    }
    if let Some(c) = RE_INLINE_OTHERWISE_IF.captures(text) {
        return Ok(RawStmt::InlineOtherwiseIf { cond: c[1].to_string(), then_text: c[2].to_string() });
    }
    if let Some(c) = RE_OTHERWISE_IF.captures(text) {
        return Ok(RawStmt::OtherwiseIf { cond: c[1].to_string() });
    }
    if RE_OTHERWISE.is_match(text) {
        return Ok(RawStmt::Otherwise);
    }
    if let Some(c) = RE_INLINE_OTHERWISE.captures(text) {
        return Ok(RawStmt::InlineOtherwise { text: c[1].to_string() });
    }
    if let Some(c) = RE_INLINE_IF.captures(text) {
        return Ok(RawStmt::InlineIf { cond: c[1].to_string(), then_text: c[2].to_string() });
    }
    if let Some(c) = RE_IF.captures(text) {
        return Ok(RawStmt::If { cond: c[1].to_string() });
    }
    if let Some(c) = RE_WHILE.captures(text) {
        return Ok(RawStmt::While { cond: c[1].to_string() });
    }
    if let Some(c) = RE_REPEAT.captures(text) {
        return Ok(RawStmt::Repeat { count: c[1].to_string() });
    }
    if let Some(c) = RE_FOR_EACH.captures(text) {
        return Ok(RawStmt::ForEach { var: c[1].to_string(), iterable: c[2].to_string() });
    }
    if RE_BREAK.is_match(text) {
        return Ok(RawStmt::Break);
    }
    if RE_CONTINUE.is_match(text) {
        return Ok(RawStmt::Continue);
    }
    if let Some(c) = RE_CALL.captures(text) {
        return Ok(RawStmt::CallStmt {
            name: c[1].to_string(),
            args: c.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            result: c.get(3).map(|m| m.as_str().to_string()),
        });
    }
    if let Some(c) = RE_RETURN.captures(text) {
        return Ok(RawStmt::Return { expr: c.get(1).map(|m| m.as_str().to_string()) });
    }
    if let Some(c) = RE_READ_FILE.captures(text) {
        return Ok(RawStmt::ReadFile { path: c[1].to_string(), target: c[2].to_string() });
    }
    if let Some(c) = RE_WRITE_FILE.captures(text) {
        return Ok(RawStmt::WriteFile { value: c[1].to_string(), path: c[2].to_string() });
    }
    if let Some(c) = RE_OUTPUT.captures(text) {
        return Ok(RawStmt::Display { expr: c[1].to_string() });
    }

    Err(VyraError::Parse {
        span,
        detail: ParseFailure::UnknownSentence { text: text.to_string() },
    })
}

/// Splits a comma/`and`-joined argument list into individual expression
/// substrings, respecting bracketed list literals and quoted strings.
pub fn split_args(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    // Normalize the final `, and X` / ` and X` join into a plain comma list.
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut parts = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];
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
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
        i += 1;
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    // The last separator is often ` and ` rather than `,`: split only the
    // final part on a top-level ` and ` if no comma already split it off.
    if parts.len() == 1 {
        if let Some(idx) = find_top_level_and(&parts[0]) {
            let (a, b) = parts[0].split_at(idx);
            let b = &b[" and ".len()..];
            return vec![a.trim().to_string(), b.trim().to_string()];
        }
    } else if let Some(last) = parts.pop() {
        if let Some(idx) = find_top_level_and(&last) {
            let (a, b) = last.split_at(idx);
            let b = &b[" and ".len()..];
            parts.push(a.trim().to_string());
            parts.push(b.trim().to_string());
        } else {
            parts.push(last);
        }
    }
    parts
}

fn find_top_level_and(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' | b'\'' => quote = Some(c),
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {
                if depth == 0 && s[i..].starts_with(" and ") {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_pattern_matches_before_general_patterns() {
        let r = match_sentence("Set x to 5", Span::EMPTY).unwrap();
        assert!(matches!(r, RawStmt::Assign { .. }));
    }

    #[test]
    fn arith_to_target_is_tried_before_ambiguous_add() {
        let r = match_sentence("Add 3 and 4 and store the result in z", Span::EMPTY).unwrap();
        assert!(matches!(r, RawStmt::ArithToTarget { op: '+', .. }));
    }

    #[test]
    fn divide_with_distinct_target_is_not_swallowed_by_in_place_form() {
        let r = match_sentence("Divide x by 0 and store in y", Span::EMPTY).unwrap();
        match r {
            RawStmt::ArithToTarget { op: '/', a, b, target } => {
                assert_eq!(a, "x");
                assert_eq!(b, "0");
                assert_eq!(target, "y");
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn add_to_list_or_number_is_ambiguous_until_resolved() {
        let r = match_sentence("Add 3 to xs", Span::EMPTY).unwrap();
        assert!(matches!(r, RawStmt::AddAmbiguous { .. }));
    }

    #[test]
    fn inline_if_captures_condition_and_then_branch() {
        let r = match_sentence(r#"If x is greater than 10, display "big""#, Span::EMPTY).unwrap();
        match r {
            RawStmt::InlineIf { cond, then_text } => {
                assert_eq!(cond, "x is greater than 10");
                assert_eq!(then_text, r#"display "big""#);
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn unknown_sentence_is_reported() {
        let err = match_sentence("Do the thing with the stuff", Span::EMPTY).unwrap_err();
        assert!(matches!(
            err,
            VyraError::Parse { detail: ParseFailure::UnknownSentence { .. }, .. }
        ));
    }

    #[test]
    fn split_args_handles_and_and_comma_joins() {
        assert_eq!(split_args("a and b"), vec!["a", "b"]);
        assert_eq!(split_args("a, b, and c"), vec!["a", "b", "c"]);
        assert_eq!(split_args("[1, 2] and y"), vec!["[1, 2]", "y"]);
    }
}
