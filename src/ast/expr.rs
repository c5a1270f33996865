//! Expression AST (spec.md §3).

use crate::error::Span;
use crate::intern::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    FollowedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Absent,
}

/// Expr variants per spec.md §3. Arena-allocated (`&'a Expr<'a>` edges)
/// so that binary trees and call argument lists can be built without
/// owning recursion, matching the teacher's `LogicExpr`/`Term` idiom.
#[derive(Debug)]
pub enum Expr<'a> {
    Literal(Literal),
    Identifier(Symbol),
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
        span: Span,
    },
    List(&'a [&'a Expr<'a>]),
    Call {
        name: Symbol,
        args: &'a [&'a Expr<'a>],
        span: Span,
    },
    Index {
        sequence: &'a Expr<'a>,
        index: &'a Expr<'a>,
        span: Span,
    },
}
