//! Pattern-based parser (spec.md §4.3): drives the sentence splitter's
//! output through the ordered regex pattern table and a recursive-descent
//! expression parser, assembling the indentation-delimited block structure
//! into an arena-allocated AST.

pub mod expr;
pub mod patterns;

use std::collections::HashSet;

use regex::Regex;

use crate::arena_ctx::AstContext;
use crate::ast::{AskKind, Block, ElifArm, Expr, Stmt};
use crate::error::{ParseFailure, Span, VyraError};
use crate::intern::{Interner, Symbol};
use crate::splitter::{split_sentences, SentenceToken, Terminator};

use patterns::{match_sentence, split_args, RawStmt};

/// Parses a full program's source text (already comment-stripped and
/// include-expanded by the source reader) into its top-level statement
/// block.
pub fn parse_program<'a>(
    source: &str,
    ctx: &AstContext<'a>,
    interner: &mut Interner,
) -> Result<Block<'a>, VyraError> {
    let sentences = split_sentences(source);
    let declared_lists = prescan_declared_lists(&sentences);
    let mut parser = Parser { tokens: sentences, pos: 0, ctx, interner, declared_lists };
    parser.parse_block(0)
}

/// First pass over the raw sentence text: records every name introduced by
/// a list-creation sentence, so the second pass can disambiguate `Add X to
/// Y` between list append and in-place arithmetic (spec.md §4.3, §9).
fn prescan_declared_lists(sentences: &[SentenceToken]) -> HashSet<String> {
    let re_empty = Regex::new(r"(?i)^Create an empty list called (\w+)$").unwrap();
    let re_values = Regex::new(r"(?i)^Create a list called (\w+) with values").unwrap();
    let mut declared = HashSet::new();
    for s in sentences {
        let text = s.text.trim();
        if let Some(c) = re_empty.captures(text) {
            declared.insert(c[1].to_string());
        } else if let Some(c) = re_values.captures(text) {
            declared.insert(c[1].to_string());
        }
    }
    declared
}

struct Parser<'a, 'b> {
    tokens: Vec<SentenceToken>,
    pos: usize,
    ctx: &'b AstContext<'a>,
    interner: &'b mut Interner,
    declared_lists: HashSet<String>,
}

impl<'a, 'b> Parser<'a, 'b> {
    fn sym(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    fn expr_from(&mut self, text: &str, span: Span) -> Result<&'a Expr<'a>, VyraError> {
        expr::parse_expr(text, span.start, self.ctx, self.interner)
    }

    fn malformed(&self, span: Span, message: impl Into<String>) -> VyraError {
        VyraError::Parse {
            span,
            detail: ParseFailure::MalformedExpression { message: message.into() },
        }
    }

    /// Parses every sentence at exactly `indent`, stopping (without
    /// consuming) at the first token whose indentation drops below it.
    fn parse_block(&mut self, indent: usize) -> Result<Block<'a>, VyraError> {
        let mut out = Vec::new();
        while self.pos < self.tokens.len() {
            let tok = self.tokens[self.pos].clone();
            if tok.indent < indent {
                break;
            }
            if tok.indent > indent {
                return Err(VyraError::Parse {
                    span: tok.span,
                    detail: ParseFailure::UnbalancedBlocks,
                });
            }
            self.pos += 1;
            let raw = match_sentence(&tok.text, tok.span)?;
            out.push(self.build_stmt(raw, &tok, indent)?);
        }
        Ok(self.ctx.alloc_stmts(out))
    }

    /// Parses the block introduced by a `:` header, if one follows at
    /// greater indentation; an absent body lowers to an empty block.
    fn parse_nested_block(&mut self, parent_indent: usize) -> Result<Block<'a>, VyraError> {
        if self.pos < self.tokens.len() && self.tokens[self.pos].indent > parent_indent {
            let child_indent = self.tokens[self.pos].indent;
            self.parse_block(child_indent)
        } else {
            Ok(self.ctx.alloc_stmts(Vec::new()))
        }
    }

    /// Consumes zero or more `Otherwise if`/`Otherwise` siblings at
    /// `indent`, in either block (`:`) or inline (`,`) form.
    fn scan_else_chain(
        &mut self,
        indent: usize,
    ) -> Result<(Vec<ElifArm<'a>>, Option<Block<'a>>), VyraError> {
        let mut elifs = Vec::new();
        let mut else_block = None;
        loop {
            if self.pos >= self.tokens.len() {
                break;
            }
            let tok = self.tokens[self.pos].clone();
            if tok.indent != indent {
                break;
            }
            let raw = match_sentence(&tok.text, tok.span)?;
            match raw {
                RawStmt::OtherwiseIf { cond } if tok.terminator == Terminator::Colon => {
                    self.pos += 1;
                    let cond_expr = self.expr_from(&cond, tok.span)?;
                    let body = self.parse_nested_block(indent)?;
                    elifs.push(ElifArm { cond: cond_expr, body });
                }
                RawStmt::InlineOtherwiseIf { cond, then_text }
                    if tok.terminator == Terminator::Period =>
                {
                    self.pos += 1;
                    let cond_expr = self.expr_from(&cond, tok.span)?;
                    let body = self.build_inline_body(&then_text, tok.span)?;
                    elifs.push(ElifArm { cond: cond_expr, body });
                }
                RawStmt::Otherwise if tok.terminator == Terminator::Colon => {
                    self.pos += 1;
                    else_block = Some(self.parse_nested_block(indent)?);
                    break;
                }
                RawStmt::InlineOtherwise { text } if tok.terminator == Terminator::Period => {
                    self.pos += 1;
                    else_block = Some(self.build_inline_body(&text, tok.span)?);
                    break;
                }
                _ => break,
            }
        }
        Ok((elifs, else_block))
    }

    /// Builds the single statement captured by an inline fragment (the
    /// tail of `If Cond, Stmt.` or `Otherwise Stmt.`), wrapped as a
    /// one-statement block.
    fn build_inline_body(&mut self, text: &str, span: Span) -> Result<Block<'a>, VyraError> {
        let raw = match_sentence(text, span)?;
        let stmt = self.build_single(raw, span)?;
        Ok(self.ctx.alloc_stmts(vec![stmt]))
    }

    fn build_stmt(
        &mut self,
        raw: RawStmt,
        tok: &SentenceToken,
        indent: usize,
    ) -> Result<&'a Stmt<'a>, VyraError> {
        match raw {
            RawStmt::If { cond } => {
                if tok.terminator != Terminator::Colon {
                    return Err(self.malformed(tok.span, "`If ...:` expects a block body"));
                }
                let cond_expr = self.expr_from(&cond, tok.span)?;
                let then_block = self.parse_nested_block(indent)?;
                let (elifs, else_block) = self.scan_else_chain(indent)?;
                let elifs = self.ctx.alloc_elifs(elifs);
                Ok(self.ctx.alloc_stmt(Stmt::If { cond: cond_expr, then_block, elifs, else_block }))
            }
            RawStmt::InlineIf { cond, then_text } => {
                let cond_expr = self.expr_from(&cond, tok.span)?;
                let then_block = self.build_inline_body(&then_text, tok.span)?;
                let (elifs, else_block) = self.scan_else_chain(indent)?;
                let elifs = self.ctx.alloc_elifs(elifs);
                Ok(self.ctx.alloc_stmt(Stmt::If { cond: cond_expr, then_block, elifs, else_block }))
            }
            RawStmt::While { cond } => {
                let cond_expr = self.expr_from(&cond, tok.span)?;
                let body = self.parse_nested_block(indent)?;
                Ok(self.ctx.alloc_stmt(Stmt::While { cond: cond_expr, body }))
            }
            RawStmt::Repeat { count } => {
                let count_expr = self.expr_from(&count, tok.span)?;
                let body = self.parse_nested_block(indent)?;
                Ok(self.ctx.alloc_stmt(Stmt::Repeat { count: count_expr, body }))
            }
            RawStmt::ForEach { var, iterable } => {
                let iterable_expr = self.expr_from(&iterable, tok.span)?;
                let var_sym = self.sym(&var);
                let body = self.parse_nested_block(indent)?;
                Ok(self.ctx.alloc_stmt(Stmt::ForEach { var: var_sym, iterable: iterable_expr, body }))
            }
            RawStmt::FunctionDef { name, params } => {
                if tok.terminator != Terminator::Colon {
                    return Err(self.malformed(tok.span, "function definitions expect a block body"));
                }
                let name_sym = self.sym(&name);
                let param_syms: Vec<Symbol> =
                    split_args(&params).iter().map(|p| self.sym(p)).collect();
                let params_slice = self.ctx.alloc_syms(param_syms);
                let body = self.parse_nested_block(indent)?;
                Ok(self.ctx.alloc_stmt(Stmt::FunctionDef { name: name_sym, params: params_slice, body }))
            }
            RawStmt::OtherwiseIf { .. }
            | RawStmt::Otherwise
            | RawStmt::InlineOtherwiseIf { .. }
            | RawStmt::InlineOtherwise { .. } => Err(VyraError::Parse {
                span: tok.span,
                detail: ParseFailure::UnexpectedToken {
                    expected: "a preceding `If`".to_string(),
                    found: "`Otherwise`".to_string(),
                },
            }),
            other => self.build_single(other, tok.span),
        }
    }

    /// Builds the leaf (non-block) statement forms: assignment, output,
    /// input, list/function calls, control transfer, and file I/O.
    fn build_single(&mut self, raw: RawStmt, span: Span) -> Result<&'a Stmt<'a>, VyraError> {
        match raw {
            RawStmt::Assign { target, expr } => {
                let value = self.expr_from(&expr, span)?;
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Assign { target, value }))
            }
            RawStmt::ArithToTarget { op, a, b, target } => {
                let a_expr = self.expr_from(&a, span)?;
                let b_expr = self.expr_from(&b, span)?;
                let binop = binop_for_char(op);
                let value = self.ctx.alloc_expr(Expr::Binary { op: binop, left: a_expr, right: b_expr, span });
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Assign { target, value }))
            }
            RawStmt::AddAmbiguous { amount, target } => {
                if self.declared_lists.contains(&target) {
                    let value = self.expr_from(&amount, span)?;
                    let target = self.sym(&target);
                    Ok(self.ctx.alloc_stmt(Stmt::ListAppend { target, value }))
                } else {
                    self.build_in_place(crate::ast::BinaryOp::Add, &target, &amount, span)
                }
            }
            RawStmt::SubtractInPlace { amount, target } => {
                self.build_in_place(crate::ast::BinaryOp::Subtract, &target, &amount, span)
            }
            RawStmt::MultiplyInPlace { amount, target } => {
                self.build_in_place(crate::ast::BinaryOp::Multiply, &target, &amount, span)
            }
            RawStmt::DivideInPlace { amount, target } => {
                self.build_in_place(crate::ast::BinaryOp::Divide, &target, &amount, span)
            }
            RawStmt::Increment { target } => {
                self.build_in_place_literal(crate::ast::BinaryOp::Add, &target, 1, span)
            }
            RawStmt::Decrement { target } => {
                self.build_in_place_literal(crate::ast::BinaryOp::Subtract, &target, 1, span)
            }
            RawStmt::Display { expr } => {
                let value = self.expr_from(&expr, span)?;
                Ok(self.ctx.alloc_stmt(Stmt::Display { value }))
            }
            RawStmt::AskText { target, prompt } => {
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Ask { target, kind: AskKind::Text, prompt }))
            }
            RawStmt::AskNumber { target } => {
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Ask { target, kind: AskKind::Number, prompt: None }))
            }
            RawStmt::ListCreateEmpty { target } => {
                let value = self.ctx.alloc_expr(Expr::List(self.ctx.alloc_exprs(Vec::new())));
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Assign { target, value }))
            }
            RawStmt::ListCreateWithValues { target, values } => {
                let mut items = Vec::new();
                for item_text in split_args(&values) {
                    items.push(self.expr_from(&item_text, span)?);
                }
                let slice = self.ctx.alloc_exprs(items);
                let value = self.ctx.alloc_expr(Expr::List(slice));
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::Assign { target, value }))
            }
            RawStmt::Break => Ok(self.ctx.alloc_stmt(Stmt::Break)),
            RawStmt::Continue => Ok(self.ctx.alloc_stmt(Stmt::Continue)),
            RawStmt::CallStmt { name, args, result } => {
                let mut arg_exprs = Vec::new();
                for arg_text in split_args(&args) {
                    arg_exprs.push(self.expr_from(&arg_text, span)?);
                }
                let args_slice = self.ctx.alloc_exprs(arg_exprs);
                let name_sym = self.sym(&name);
                let result_target = result.map(|r| self.sym(&r));
                Ok(self.ctx.alloc_stmt(Stmt::Call { name: name_sym, args: args_slice, result_target }))
            }
            RawStmt::Return { expr } => {
                let value = match expr {
                    Some(e) => Some(self.expr_from(&e, span)?),
                    None => None,
                };
                Ok(self.ctx.alloc_stmt(Stmt::Return { value }))
            }
            RawStmt::ReadFile { path, target } => {
                let path_expr = self.expr_from(&path, span)?;
                let target = self.sym(&target);
                Ok(self.ctx.alloc_stmt(Stmt::ReadFile { path: path_expr, target }))
            }
            RawStmt::WriteFile { value, path } => {
                let value_expr = self.expr_from(&value, span)?;
                let path_expr = self.expr_from(&path, span)?;
                Ok(self.ctx.alloc_stmt(Stmt::WriteFile { value: value_expr, path: path_expr }))
            }
            RawStmt::If { .. }
            | RawStmt::InlineIf { .. }
            | RawStmt::While { .. }
            | RawStmt::Repeat { .. }
            | RawStmt::ForEach { .. }
            | RawStmt::FunctionDef { .. }
            | RawStmt::OtherwiseIf { .. }
            | RawStmt::Otherwise
            | RawStmt::InlineOtherwiseIf { .. }
            | RawStmt::InlineOtherwise { .. } => {
                Err(self.malformed(span, "a block-opening sentence cannot appear inline"))
            }
        }
    }

    fn build_in_place(
        &mut self,
        op: crate::ast::BinaryOp,
        target: &str,
        amount: &str,
        span: Span,
    ) -> Result<&'a Stmt<'a>, VyraError> {
        let target_sym = self.sym(target);
        let target_expr = self.ctx.alloc_expr(Expr::Identifier(target_sym));
        let amount_expr = self.expr_from(amount, span)?;
        let value =
            self.ctx.alloc_expr(Expr::Binary { op, left: target_expr, right: amount_expr, span });
        Ok(self.ctx.alloc_stmt(Stmt::Assign { target: target_sym, value }))
    }

    fn build_in_place_literal(
        &mut self,
        op: crate::ast::BinaryOp,
        target: &str,
        literal: i64,
        span: Span,
    ) -> Result<&'a Stmt<'a>, VyraError> {
        let target_sym = self.sym(target);
        let target_expr = self.ctx.alloc_expr(Expr::Identifier(target_sym));
        let amount_expr = self.ctx.alloc_expr(Expr::Literal(crate::ast::Literal::Int(literal)));
        let value =
            self.ctx.alloc_expr(Expr::Binary { op, left: target_expr, right: amount_expr, span });
        Ok(self.ctx.alloc_stmt(Stmt::Assign { target: target_sym, value }))
    }
}

fn binop_for_char(op: char) -> crate::ast::BinaryOp {
    use crate::ast::BinaryOp::*;
    match op {
        '+' => Add,
        '-' => Subtract,
        '*' => Multiply,
        '/' => Divide,
        _ => unreachable!("arith-to-target only emits +-*/"),
    }
}
