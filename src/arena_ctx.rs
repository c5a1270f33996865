//! Bundles the expression/statement arenas the parser allocates into, the
//! way the original transpiler's `AstContext` bundled its term/expr arenas.

use crate::arena::Arena;
use crate::ast::{ElifArm, Expr, Stmt};
use crate::intern::Symbol;

#[derive(Clone, Copy)]
pub struct AstContext<'a> {
    pub exprs: &'a Arena<Expr<'a>>,
    pub stmts: &'a Arena<Stmt<'a>>,
    pub expr_lists: &'a Arena<&'a Expr<'a>>,
    pub stmt_lists: &'a Arena<&'a Stmt<'a>>,
    pub elif_arms: &'a Arena<ElifArm<'a>>,
    pub syms: &'a Arena<Symbol>,
}

impl<'a> AstContext<'a> {
    pub fn new(
        exprs: &'a Arena<Expr<'a>>,
        stmts: &'a Arena<Stmt<'a>>,
        expr_lists: &'a Arena<&'a Expr<'a>>,
        stmt_lists: &'a Arena<&'a Stmt<'a>>,
        elif_arms: &'a Arena<ElifArm<'a>>,
        syms: &'a Arena<Symbol>,
    ) -> Self {
        AstContext { exprs, stmts, expr_lists, stmt_lists, elif_arms, syms }
    }

    pub fn alloc_expr(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(expr)
    }

    pub fn alloc_stmt(&self, stmt: Stmt<'a>) -> &'a Stmt<'a> {
        self.stmts.alloc(stmt)
    }

    pub fn alloc_exprs<I>(&self, items: I) -> &'a [&'a Expr<'a>]
    where
        I: IntoIterator<Item = &'a Expr<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.expr_lists.alloc_slice(items)
    }

    pub fn alloc_stmts<I>(&self, items: I) -> &'a [&'a Stmt<'a>]
    where
        I: IntoIterator<Item = &'a Stmt<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.stmt_lists.alloc_slice(items)
    }

    pub fn alloc_elifs<I>(&self, items: I) -> &'a [ElifArm<'a>]
    where
        I: IntoIterator<Item = ElifArm<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.elif_arms.alloc_slice(items)
    }

    pub fn alloc_syms<I>(&self, items: I) -> &'a [Symbol]
    where
        I: IntoIterator<Item = Symbol>,
        I::IntoIter: ExactSizeIterator,
    {
        self.syms.alloc_slice(items)
    }
}
