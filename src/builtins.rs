//! Built-in functions (spec.md §4.5): `length`, `len`, `abs`, `round`,
//! `uppercase`, `lowercase`, `split`, `join`, `type_of`, and the numeric
//! conversions `to_number`/`to_text`. Dispatched by resolved name rather
//! than through the function table, since built-ins have no logic-graph
//! entry node to call into.

use crate::error::{Span, VyraError};
use crate::intern::Interner;
use crate::value::Value;

pub fn call(name: crate::intern::Symbol, args: Vec<Value>, span: Span, interner: &Interner) -> Result<Value, VyraError> {
    let name = interner.resolve(name);
    match name {
        "length" | "len" => length(args, span),
        "abs" => abs(args, span),
        "round" => round(args, span),
        "uppercase" => uppercase(args, span),
        "lowercase" => lowercase(args, span),
        "split" => split(args, span),
        "join" => join(args, span),
        "type_of" => type_of(args, span),
        "to_number" => to_number(args, span),
        "to_text" => to_text(args, span),
        other => Err(VyraError::Name { span, identifier: other.to_string() }),
    }
}

fn arity(name: &str, args: &[Value], expected: usize, span: Span) -> Result<(), VyraError> {
    if args.len() != expected {
        Err(VyraError::Arity { span, function: name.to_string(), expected, found: args.len() })
    } else {
        Ok(())
    }
}

fn length(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("length", &args, 1, span)?;
    match &args[0] {
        Value::Sequence(items) => Ok(Value::Int(items.borrow().len() as i64)),
        Value::Text(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(type_error(span, "a list or text", other)),
    }
}

fn abs(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("abs", &args, 1, span)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_error(span, "a number", other)),
    }
}

fn round(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("round", &args, 1, span)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Int(f.round() as i64)),
        other => Err(type_error(span, "a number", other)),
    }
}

fn uppercase(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("uppercase", &args, 1, span)?;
    match &args[0] {
        Value::Text(s) => Ok(Value::Text(s.to_uppercase())),
        other => Err(type_error(span, "text", other)),
    }
}

fn lowercase(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("lowercase", &args, 1, span)?;
    match &args[0] {
        Value::Text(s) => Ok(Value::Text(s.to_lowercase())),
        other => Err(type_error(span, "text", other)),
    }
}

fn split(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("split", &args, 2, span)?;
    match (&args[0], &args[1]) {
        (Value::Text(s), Value::Text(sep)) => {
            let parts = if sep.is_empty() {
                s.chars().map(|c| Value::Text(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::Text(p.to_string())).collect()
            };
            Ok(Value::sequence(parts))
        }
        (a, b) => Err(type_error(span, "text and a text separator", if matches!(a, Value::Text(_)) { b } else { a })),
    }
}

fn join(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("join", &args, 2, span)?;
    match (&args[0], &args[1]) {
        (Value::Sequence(items), Value::Text(sep)) => {
            let parts: Vec<String> = items.borrow().iter().map(Value::to_display_string).collect();
            Ok(Value::Text(parts.join(sep)))
        }
        (a, b) => Err(type_error(span, "a list and a text separator", if matches!(a, Value::Sequence(_)) { b } else { a })),
    }
}

fn type_of(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("type_of", &args, 1, span)?;
    Ok(Value::Text(args[0].type_name().to_string()))
}

fn to_number(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("to_number", &args, 1, span)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Text(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                Ok(Value::Int(n))
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Ok(Value::Float(f))
            } else {
                Err(VyraError::Type { span, message: format!("\"{}\" is not a number", s) })
            }
        }
        other => Err(type_error(span, "text or a number", other)),
    }
}

fn to_text(args: Vec<Value>, span: Span) -> Result<Value, VyraError> {
    arity("to_text", &args, 1, span)?;
    Ok(Value::Text(args[0].to_display_string()))
}

fn type_error(span: Span, expected: &str, found: &Value) -> VyraError {
    VyraError::Type { span, message: format!("expected {}, found {}", expected, found.type_name()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    fn call_named(interner: &mut Interner, name: &str, args: Vec<Value>) -> Result<Value, VyraError> {
        let sym = interner.intern(name);
        call(sym, args, Span::EMPTY, interner)
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "length", vec![Value::Text("hi".into())]);
        assert!(matches!(result, Ok(Value::Int(2))));
    }

    #[test]
    fn round_rounds_half_away_from_zero() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "round", vec![Value::Float(2.5)]);
        assert!(matches!(result, Ok(Value::Int(3))));
    }

    #[test]
    fn split_on_empty_separator_splits_into_characters() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "split", vec![Value::Text("ab".into()), Value::Text(String::new())]);
        match result {
            Ok(Value::Sequence(items)) => assert_eq!(items.borrow().len(), 2),
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn join_renders_nested_values_without_quotes() {
        let mut interner = Interner::new();
        let list = Value::sequence(vec![Value::Int(1), Value::Int(2)]);
        let result = call_named(&mut interner, "join", vec![list, Value::Text(", ".into())]);
        assert!(matches!(result, Ok(Value::Text(s)) if s == "1, 2"));
    }

    #[test]
    fn to_number_parses_int_before_float() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "to_number", vec![Value::Text("42".into())]);
        assert!(matches!(result, Ok(Value::Int(42))));
    }

    #[test]
    fn unknown_builtin_name_is_a_name_error() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "frobnicate", vec![]);
        assert!(matches!(result, Err(VyraError::Name { .. })));
    }

    #[test]
    fn wrong_arity_is_an_arity_error() {
        let mut interner = Interner::new();
        let result = call_named(&mut interner, "abs", vec![]);
        assert!(matches!(result, Err(VyraError::Arity { .. })));
    }
}
