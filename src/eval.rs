//! Expression evaluation (spec.md §3 operator semantics, §4.5, §6).
//!
//! A plain recursive evaluator over `&Expr<'_>` rather than a bytecode VM,
//! mirroring the way the teacher's `kripke.rs` walks `LogicExpr` trees
//! directly instead of compiling them further. `Expr::Call` here only ever
//! reaches a *built-in* function (`builtins::call`) — calls to
//! user-defined functions are `Stmt::Call` nodes in the logic graph, since
//! they need the frame stack that a pure expression evaluator does not
//! have access to.

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::builtins;
use crate::error::{Span, VyraError};
use crate::intern::{Interner, Symbol};
use crate::scope::Scopes;
use crate::value::Value;

pub fn eval_expr(expr: &Expr<'_>, scopes: &Scopes, interner: &Interner) -> Result<Value, VyraError> {
    match expr {
        Expr::Literal(lit) => Ok(eval_literal(lit)),
        Expr::Identifier(sym) => lookup(*sym, scopes, interner),
        Expr::Unary { op, operand, span } => eval_unary(*op, operand, *span, scopes, interner),
        Expr::Binary { op, left, right, span } => eval_binary(*op, left, right, *span, scopes, interner),
        Expr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in *items {
                values.push(eval_expr(item, scopes, interner)?);
            }
            Ok(Value::sequence(values))
        }
        Expr::Call { name, args, span } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in *args {
                values.push(eval_expr(arg, scopes, interner)?);
            }
            builtins::call(*name, values, *span, interner)
        }
        Expr::Index { sequence, index, span } => eval_index(sequence, index, *span, scopes, interner),
    }
}

fn lookup(sym: Symbol, scopes: &Scopes, interner: &Interner) -> Result<Value, VyraError> {
    scopes
        .get(sym)
        .cloned()
        .ok_or_else(|| VyraError::Name { span: Span::EMPTY, identifier: interner.resolve(sym).to_string() })
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(f) => Value::Float(*f),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Text(s) => Value::Text(s.clone()),
        Literal::Absent => Value::Absent,
    }
}

fn eval_unary(
    op: UnaryOp,
    operand: &Expr<'_>,
    span: Span,
    scopes: &Scopes,
    interner: &Interner,
) -> Result<Value, VyraError> {
    let value = eval_expr(operand, scopes, interner)?;
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Negate => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(type_error(span, "a number", &other)),
        },
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr<'_>,
    right: &Expr<'_>,
    span: Span,
    scopes: &Scopes,
    interner: &Interner,
) -> Result<Value, VyraError> {
    // And/Or short-circuit, so the right operand is only evaluated when
    // the left one didn't already decide the result (spec.md §3).
    if op == BinaryOp::And {
        let l = eval_expr(left, scopes, interner)?;
        if !l.is_truthy() {
            return Ok(Value::Bool(false));
        }
        let r = eval_expr(right, scopes, interner)?;
        return Ok(Value::Bool(r.is_truthy()));
    }
    if op == BinaryOp::Or {
        let l = eval_expr(left, scopes, interner)?;
        if l.is_truthy() {
            return Ok(Value::Bool(true));
        }
        let r = eval_expr(right, scopes, interner)?;
        return Ok(Value::Bool(r.is_truthy()));
    }

    let l = eval_expr(left, scopes, interner)?;
    let r = eval_expr(right, scopes, interner)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(l.structural_eq(&r))),
        BinaryOp::NotEq => Ok(Value::Bool(!l.structural_eq(&r))),
        BinaryOp::FollowedBy => Ok(Value::Text(format!("{}{}", l.to_display_string(), r.to_display_string()))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, &l, &r, span),
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo | BinaryOp::Power => {
            arithmetic(op, &l, &r, span)
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn compare(op: BinaryOp, l: &Value, r: &Value, span: Span) -> Result<Value, VyraError> {
    if let (Value::Text(a), Value::Text(b)) = (l, r) {
        let ord = a.cmp(b);
        return Ok(Value::Bool(match op {
            BinaryOp::Lt => ord.is_lt(),
            BinaryOp::LtEq => ord.is_le(),
            BinaryOp::Gt => ord.is_gt(),
            BinaryOp::GtEq => ord.is_ge(),
            _ => unreachable!(),
        }));
    }
    let (a, b) = (as_f64(l), as_f64(r));
    match (a, b) {
        (Some(a), Some(b)) => Ok(Value::Bool(match op {
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::GtEq => a >= b,
            _ => unreachable!(),
        })),
        _ => Err(VyraError::Type {
            span,
            message: format!("cannot compare {} and {}", l.type_name(), r.type_name()),
        }),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value, span: Span) -> Result<Value, VyraError> {
    // Two integers stay integers (except Power and Divide, which can
    // overflow expectations of integer-ness, so both follow the teacher's
    // "widen on exact division/exponent" convention of promoting to float
    // whenever the inputs aren't already both floats and the result
    // wouldn't be exact).
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return int_arithmetic(op, *a, *b, span);
    }
    let (a, b) = match (as_f64(l), as_f64(r)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(VyraError::Type {
                span,
                message: format!("cannot apply arithmetic to {} and {}", l.type_name(), r.type_name()),
            })
        }
    };
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Subtract => Ok(Value::Float(a - b)),
        BinaryOp::Multiply => Ok(Value::Float(a * b)),
        BinaryOp::Divide => {
            if b == 0.0 {
                Err(VyraError::DivisionByZero { span })
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinaryOp::Modulo => {
            if b == 0.0 {
                Err(VyraError::DivisionByZero { span })
            } else {
                Ok(Value::Float(a % b))
            }
        }
        BinaryOp::Power => Ok(Value::Float(a.powf(b))),
        _ => unreachable!("non-arithmetic op reached arithmetic()"),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64, span: Span) -> Result<Value, VyraError> {
    match op {
        BinaryOp::Add => Ok(Value::Int(a.wrapping_add(b))),
        BinaryOp::Subtract => Ok(Value::Int(a.wrapping_sub(b))),
        BinaryOp::Multiply => Ok(Value::Int(a.wrapping_mul(b))),
        BinaryOp::Divide => {
            if b == 0 {
                Err(VyraError::DivisionByZero { span })
            } else if a.wrapping_rem(b) == 0 {
                Ok(Value::Int(a.wrapping_div(b)))
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        BinaryOp::Modulo => {
            if b == 0 {
                Err(VyraError::DivisionByZero { span })
            } else {
                // Truncated-toward-zero, matching spec.md §4.5's convention
                // and Rust's native integer `%`. `wrapping_rem` avoids the
                // `i64::MIN % -1` panic that plain `%` has.
                Ok(Value::Int(a.wrapping_rem(b)))
            }
        }
        BinaryOp::Power => {
            if b >= 0 && b <= u32::MAX as i64 {
                Ok(Value::Int(a.wrapping_pow(b as u32)))
            } else {
                Ok(Value::Float((a as f64).powf(b as f64)))
            }
        }
        _ => unreachable!("non-arithmetic op reached int_arithmetic()"),
    }
}

fn eval_index(
    sequence: &Expr<'_>,
    index: &Expr<'_>,
    span: Span,
    scopes: &Scopes,
    interner: &Interner,
) -> Result<Value, VyraError> {
    let seq = eval_expr(sequence, scopes, interner)?;
    let idx = eval_expr(index, scopes, interner)?;
    let i = match idx {
        Value::Int(n) => n,
        other => return Err(type_error(span, "an integer index", &other)),
    };
    match seq {
        Value::Sequence(items) => {
            let items = items.borrow();
            let len = items.len();
            usize::try_from(i)
                .ok()
                .filter(|i| *i < len)
                .map(|i| items[i].clone())
                .ok_or(VyraError::Index { span, index: i, len })
        }
        Value::Text(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            usize::try_from(i)
                .ok()
                .filter(|i| *i < len)
                .map(|i| Value::Text(chars[i].to_string()))
                .ok_or(VyraError::Index { span, index: i, len })
        }
        other => Err(type_error(span, "a list or text", &other)),
    }
}

fn type_error(span: Span, expected: &str, found: &Value) -> VyraError {
    VyraError::Type { span, message: format!("expected {}, found {}", expected, found.type_name()) }
}
