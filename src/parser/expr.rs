//! Recursive-descent expression parser (spec.md §4.3): turns the lexer's
//! token stream into an arena-allocated `Expr` tree, honoring the
//! precedence ladder low-to-high:
//! `or` < `and` < `not` < comparisons < `followed by` < `+ -` < `* / %`
//! < unary minus < `**` (right-assoc) < primary.

use crate::arena_ctx::AstContext;
use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::error::{ParseFailure, Span, VyraError};
use crate::intern::Interner;
use crate::lexer::{tokenize, Token, TokenKind};

pub fn parse_expr<'a>(
    text: &str,
    base_offset: usize,
    ctx: &AstContext<'a>,
    interner: &mut Interner,
) -> Result<&'a Expr<'a>, VyraError> {
    let tokens = tokenize(text, base_offset);
    let mut p = ExprParser { tokens, pos: 0, ctx, interner };
    let expr = p.parse_or()?;
    p.expect_eof()?;
    Ok(expr)
}

struct ExprParser<'a, 'b> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: &'b AstContext<'a>,
    interner: &'b mut Interner,
}

impl<'a, 'b> ExprParser<'a, 'b> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<(), VyraError> {
        if matches!(self.peek(), TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    fn unexpected(&self, expected: &str) -> VyraError {
        VyraError::Parse {
            span: self.peek_span(),
            detail: ParseFailure::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", self.peek()),
            },
        }
    }

    fn parse_or(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), TokenKind::Or) {
            let span = self.advance().span;
            let right = self.parse_and()?;
            left = self.ctx.alloc_expr(Expr::Binary { op: BinaryOp::Or, left, right, span });
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), TokenKind::And) {
            let span = self.advance().span;
            let right = self.parse_not()?;
            left = self.ctx.alloc_expr(Expr::Binary { op: BinaryOp::And, left, right, span });
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        if matches!(self.peek(), TokenKind::Not) {
            let span = self.advance().span;
            let operand = self.parse_not()?;
            return Ok(self.ctx.alloc_expr(Expr::Unary { op: UnaryOp::Not, operand, span }));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let left = self.parse_followed_by()?;
        let op = match self.peek() {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            _ => return Ok(left),
        };
        let span = self.advance().span;
        let right = self.parse_followed_by()?;
        Ok(self.ctx.alloc_expr(Expr::Binary { op, left, right, span }))
    }

    fn parse_followed_by(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let left = self.parse_additive()?;
        if matches!(self.peek(), TokenKind::FollowedBy) {
            let span = self.advance().span;
            let right = self.parse_additive()?;
            return Ok(self.ctx.alloc_expr(Expr::Binary { op: BinaryOp::FollowedBy, left, right, span }));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            let span = self.advance().span;
            let right = self.parse_multiplicative()?;
            left = self.ctx.alloc_expr(Expr::Binary { op, left, right, span });
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => break,
            };
            let span = self.advance().span;
            let right = self.parse_unary()?;
            left = self.ctx.alloc_expr(Expr::Binary { op, left, right, span });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        if matches!(self.peek(), TokenKind::Minus) {
            let span = self.advance().span;
            let operand = self.parse_unary()?;
            return Ok(self.ctx.alloc_expr(Expr::Unary { op: UnaryOp::Negate, operand, span }));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let left = self.parse_postfix()?;
        if matches!(self.peek(), TokenKind::StarStar) {
            let span = self.advance().span;
            // Right-associative: recurse into parse_unary so `2 ** 3 ** 2` groups as `2 ** (3 ** 2)`.
            let right = self.parse_unary()?;
            return Ok(self.ctx.alloc_expr(Expr::Binary { op: BinaryOp::Power, left, right, span }));
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let mut expr = self.parse_primary()?;
        loop {
            if matches!(self.peek(), TokenKind::LBracket) {
                let start = self.advance().span;
                let index = self.parse_or()?;
                let end = self.expect(TokenKind::RBracket, "]")?;
                expr = self.ctx.alloc_expr(Expr::Index {
                    sequence: expr,
                    index,
                    span: Span::new(start.start, end.end),
                });
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn expect(&mut self, want: TokenKind, label: &str) -> Result<Span, VyraError> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(&want) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(label))
        }
    }

    fn parse_primary(&mut self) -> Result<&'a Expr<'a>, VyraError> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Int(n))))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Float(f))))
            }
            TokenKind::Text(s) => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Text(s))))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Bool(true))))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Bool(false))))
            }
            TokenKind::Nothing => {
                self.advance();
                Ok(self.ctx.alloc_expr(Expr::Literal(Literal::Absent)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !matches!(self.peek(), TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_or()?);
                        if matches!(self.peek(), TokenKind::Comma) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                let end = self.expect(TokenKind::RBracket, "]")?;
                let slice = self.ctx.alloc_exprs(items);
                let _ = end;
                Ok(self.ctx.alloc_expr(Expr::List(slice)))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if matches!(self.peek(), TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), TokenKind::RParen) {
                        loop {
                            args.push(self.parse_or()?);
                            if matches!(self.peek(), TokenKind::Comma) {
                                self.advance();
                                continue;
                            }
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen, ")")?;
                    let sym = self.interner.intern(&name);
                    let arg_slice = self.ctx.alloc_exprs(args);
                    return Ok(self.ctx.alloc_expr(Expr::Call {
                        name: sym,
                        args: arg_slice,
                        span: Span::new(span.start, end.end),
                    }));
                }
                let sym = self.interner.intern(&name);
                Ok(self.ctx.alloc_expr(Expr::Identifier(sym)))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn fresh<'a>(
        exprs: &'a Arena<Expr<'a>>,
        stmts: &'a Arena<crate::ast::Stmt<'a>>,
        expr_lists: &'a Arena<&'a Expr<'a>>,
        stmt_lists: &'a Arena<&'a crate::ast::Stmt<'a>>,
        elif_arms: &'a Arena<crate::ast::ElifArm<'a>>,
        syms: &'a Arena<crate::intern::Symbol>,
    ) -> AstContext<'a> {
        AstContext::new(exprs, stmts, expr_lists, stmt_lists, elif_arms, syms)
    }

    #[test]
    fn parses_arithmetic_with_precedence() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("1 + 2 * 3", 0, &ctx, &mut interner).unwrap();
        match e {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(right, Expr::Binary { op: BinaryOp::Multiply, .. }));
            }
            _ => panic!("expected Add at top level"),
        }
    }

    #[test]
    fn parses_comparison_phrase() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("x is greater than 10", 0, &ctx, &mut interner).unwrap();
        assert!(matches!(e, Expr::Binary { op: BinaryOp::Gt, .. }));
    }

    #[test]
    fn power_is_right_associative() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("2 ** 3 ** 2", 0, &ctx, &mut interner).unwrap();
        match e {
            Expr::Binary { op: BinaryOp::Power, right, .. } => {
                assert!(matches!(right, Expr::Binary { op: BinaryOp::Power, .. }));
            }
            _ => panic!("expected Power at top level"),
        }
    }

    #[test]
    fn indexing_binds_tighter_than_arithmetic() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("xs[0] + 1", 0, &ctx, &mut interner).unwrap();
        match e {
            Expr::Binary { op: BinaryOp::Add, left, .. } => {
                assert!(matches!(left, Expr::Index { .. }));
            }
            _ => panic!("expected Add at top level"),
        }
    }

    #[test]
    fn list_literal_parses_elements() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("[1, 2, 3]", 0, &ctx, &mut interner).unwrap();
        match e {
            Expr::List(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected List"),
        }
    }

    #[test]
    fn call_expression_parses_args() {
        let exprs = Arena::new();
        let stmts = Arena::new();
        let expr_lists = Arena::new();
        let stmt_lists = Arena::new();
        let elif_arms = Arena::new();
        let syms = Arena::new();
        let ctx = fresh(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();

        let e = parse_expr("length(xs)", 0, &ctx, &mut interner).unwrap();
        match e {
            Expr::Call { args, .. } => assert_eq!(args.len(), 1),
            _ => panic!("expected Call"),
        }
    }
}
