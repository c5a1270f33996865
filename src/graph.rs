//! Logic graph IR (spec.md §3, §4.4): the lowered form the interpreter
//! actually walks. Nodes are stored in a flat `Vec` and refer to each other
//! by index rather than by pointer, the way the teacher's proof kernel
//! keeps `Term`/`LogicExpr` trees in arenas instead of `Rc`-linked graphs —
//! here the graph can contain back-edges (loops), which a borrowed-pointer
//! tree cannot express at all.

use std::collections::HashMap;

use crate::arena_ctx::AstContext;
use crate::ast::stmt::ElifArm;
use crate::ast::{AskKind, BinaryOp, Block, Expr, Literal, Stmt};
use crate::error::{ParseFailure, Span, VyraError};
use crate::intern::{Interner, Symbol};

pub type NodeId = usize;

/// The single-instruction operations a node can carry. Control-flow forks
/// are a distinct `Node::Branch` variant rather than an opcode, since they
/// need two successors instead of one.
#[derive(Debug)]
pub enum Opcode<'a> {
    Assign { target: Symbol, value: &'a Expr<'a> },
    Display { value: &'a Expr<'a> },
    Ask { target: Symbol, kind: AskKind, prompt: Option<String> },
    ListAppend { target: Symbol, value: &'a Expr<'a> },
    ReadFile { path: &'a Expr<'a>, target: Symbol },
    WriteFile { value: &'a Expr<'a>, path: &'a Expr<'a> },
    Call { name: Symbol, args: &'a [&'a Expr<'a>], result_target: Option<Symbol> },
    Return { value: Option<&'a Expr<'a>> },
    /// Materializes `source` into `cache` as a list (characters for a
    /// string, elements unchanged for a sequence) once, before a `ForEach`
    /// loop starts iterating it. See spec.md §9's resolved open question
    /// on iterating strings.
    ForEachInit { cache: Symbol, source: &'a Expr<'a> },
}

#[derive(Debug)]
pub enum Node<'a> {
    Op { op: Opcode<'a>, next: NodeId },
    Branch { cond: &'a Expr<'a>, then_next: NodeId, else_next: NodeId, is_loop: bool },
    /// Marks the fall-off-the-end of a function body as an implicit
    /// return, so the interpreter can pop the frame without a literal
    /// `Return` statement in the source.
    FuncExit,
    /// Terminal marker for the whole program; reaching it halts execution.
    Halt,
}

pub struct FunctionRecord<'a> {
    pub params: &'a [Symbol],
    pub entry: NodeId,
}

pub struct Graph<'a> {
    pub nodes: Vec<Node<'a>>,
    pub functions: HashMap<Symbol, FunctionRecord<'a>>,
    pub entry: NodeId,
}

impl<'a> Graph<'a> {
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id]
    }
}

/// A loop's break/continue targets, pushed while its body is being lowered
/// so `Break`/`Continue` inside it (at any nesting depth of `If`) resolve
/// to the right node without threading extra parameters through every
/// `lower_stmt` call.
struct LoopCtx {
    break_target: NodeId,
    continue_target: NodeId,
}

pub struct GraphBuilder<'a, 'i> {
    nodes: Vec<Node<'a>>,
    functions: HashMap<Symbol, FunctionRecord<'a>>,
    loop_stack: Vec<LoopCtx>,
    ctx: AstContext<'a>,
    interner: &'i mut Interner,
    fresh_counter: u32,
}

impl<'a, 'i> GraphBuilder<'a, 'i> {
    pub fn new(ctx: AstContext<'a>, interner: &'i mut Interner) -> Self {
        GraphBuilder {
            nodes: Vec::new(),
            functions: HashMap::new(),
            loop_stack: Vec::new(),
            ctx,
            interner,
            fresh_counter: 0,
        }
    }

    /// Interns a name no source program can type (leading double
    /// underscore plus a monotonically increasing counter), the way the
    /// teacher's `KripkeContext::fresh_world` mints `w0`, `w1`, ... names
    /// that can never collide with user-written ones.
    fn fresh_symbol(&mut self, prefix: &str) -> Symbol {
        let id = self.fresh_counter;
        self.fresh_counter += 1;
        self.interner.intern(&format!("__{}{}", prefix, id))
    }

    fn push(&mut self, node: Node<'a>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Reserves a node slot to be filled in later, for nodes (loop heads)
    /// whose own successors can only be computed after their body is
    /// built.
    fn reserve(&mut self) -> NodeId {
        self.push(Node::Halt)
    }

    fn fill(&mut self, id: NodeId, node: Node<'a>) {
        self.nodes[id] = node;
    }

    fn ident(&self, sym: Symbol) -> &'a Expr<'a> {
        self.ctx.alloc_expr(Expr::Identifier(sym))
    }

    fn int_lit(&self, n: i64) -> &'a Expr<'a> {
        self.ctx.alloc_expr(Expr::Literal(Literal::Int(n)))
    }

    fn binary(&self, op: BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        self.ctx.alloc_expr(Expr::Binary { op, left, right, span: Span::EMPTY })
    }

    fn call(&self, name: Symbol, args: &[&'a Expr<'a>]) -> &'a Expr<'a> {
        let args = self.ctx.alloc_exprs(args.iter().copied());
        self.ctx.alloc_expr(Expr::Call { name, args, span: Span::EMPTY })
    }

    /// Builds the whole-program graph: a `Halt` node, every top-level
    /// `FunctionDef` registered in the function table, and the remaining
    /// top-level statements lowered into the entry block.
    pub fn build_program(mut self, program: Block<'a>) -> Result<Graph<'a>, VyraError> {
        let halt = self.push(Node::Halt);

        let mut top_level: Vec<&'a Stmt<'a>> = Vec::new();
        for stmt in program {
            if let Stmt::FunctionDef { name, params, body } = stmt {
                let exit = self.push(Node::FuncExit);
                let entry = self.lower_block(body, exit)?;
                self.functions.insert(*name, FunctionRecord { params, entry });
            } else {
                top_level.push(stmt);
            }
        }

        let stmt_refs = self.ctx.alloc_stmts(top_level.iter().copied());
        let entry = self.lower_block(stmt_refs, halt)?;

        Ok(Graph { nodes: self.nodes, functions: self.functions, entry })
    }

    fn lower_block(&mut self, stmts: Block<'a>, succ: NodeId) -> Result<NodeId, VyraError> {
        let mut succ = succ;
        for stmt in stmts.iter().rev() {
            succ = self.lower_stmt(stmt, succ)?;
        }
        Ok(succ)
    }

    fn lower_stmt(&mut self, stmt: &'a Stmt<'a>, succ: NodeId) -> Result<NodeId, VyraError> {
        Ok(match stmt {
            Stmt::Assign { target, value } => {
                self.push(Node::Op { op: Opcode::Assign { target: *target, value }, next: succ })
            }
            Stmt::Display { value } => {
                self.push(Node::Op { op: Opcode::Display { value }, next: succ })
            }
            Stmt::Ask { target, kind, prompt } => self.push(Node::Op {
                op: Opcode::Ask { target: *target, kind: *kind, prompt: prompt.clone() },
                next: succ,
            }),
            Stmt::ListAppend { target, value } => {
                self.push(Node::Op { op: Opcode::ListAppend { target: *target, value }, next: succ })
            }
            Stmt::ReadFile { path, target } => {
                self.push(Node::Op { op: Opcode::ReadFile { path, target: *target }, next: succ })
            }
            Stmt::WriteFile { value, path } => {
                self.push(Node::Op { op: Opcode::WriteFile { value, path }, next: succ })
            }
            Stmt::Call { name, args, result_target } => self.push(Node::Op {
                op: Opcode::Call { name: *name, args, result_target: *result_target },
                next: succ,
            }),
            Stmt::Return { value } => {
                self.push(Node::Op { op: Opcode::Return { value: *value }, next: succ })
            }
            Stmt::Break => {
                self.loop_stack.last().ok_or_else(|| loop_control_error("Break"))?.break_target
            }
            Stmt::Continue => {
                self.loop_stack.last().ok_or_else(|| loop_control_error("Continue"))?.continue_target
            }
            Stmt::FunctionDef { name, params, body } => {
                // Nested function defs lower the same as top-level ones:
                // register the function, contribute no node of their own.
                let exit = self.push(Node::FuncExit);
                let entry = self.lower_block(body, exit)?;
                self.functions.insert(*name, FunctionRecord { params, entry });
                succ
            }
            Stmt::If { cond, then_block, elifs, else_block } => {
                let mut else_target = match else_block {
                    Some(block) => self.lower_block(block, succ)?,
                    None => succ,
                };
                for arm in elifs.iter().rev() {
                    let ElifArm { cond, body } = arm;
                    let then_target = self.lower_block(body, succ)?;
                    else_target = self.push(Node::Branch { cond, then_next: then_target, else_next: else_target, is_loop: false });
                }
                let then_target = self.lower_block(then_block, succ)?;
                self.push(Node::Branch { cond, then_next: then_target, else_next: else_target, is_loop: false })
            }
            Stmt::While { cond, body } => {
                let head = self.reserve();
                self.loop_stack.push(LoopCtx { break_target: succ, continue_target: head });
                let body_start = self.lower_block(body, head);
                self.loop_stack.pop();
                let body_start = body_start?;
                self.fill(head, Node::Branch { cond, then_next: body_start, else_next: succ, is_loop: true });
                head
            }
            Stmt::Repeat { count, body } => self.lower_repeat(count, body, succ)?,
            Stmt::ForEach { var, iterable, body } => self.lower_for_each(*var, iterable, body, succ)?,
        })
    }

    /// Desugars `Repeat N times: body` into a counted `While`, per
    /// spec.md §4.4: `counter := 0; while counter < N: body; counter :=
    /// counter + 1`. `Continue` still has to run the increment before
    /// looping back, so it targets the increment node, not the head.
    fn lower_repeat(&mut self, count: &'a Expr<'a>, body: Block<'a>, succ: NodeId) -> Result<NodeId, VyraError> {
        let counter = self.fresh_symbol("repeat_counter");
        let head = self.reserve();
        let incr = self.reserve();

        self.loop_stack.push(LoopCtx { break_target: succ, continue_target: incr });
        let body_start = self.lower_block(body, incr);
        self.loop_stack.pop();
        let body_start = body_start?;

        let incr_value = self.binary(BinaryOp::Add, self.ident(counter), self.int_lit(1));
        self.fill(incr, Node::Op { op: Opcode::Assign { target: counter, value: incr_value }, next: head });

        let cond = self.binary(BinaryOp::Lt, self.ident(counter), count);
        self.fill(head, Node::Branch { cond, then_next: body_start, else_next: succ, is_loop: true });

        Ok(self.push(Node::Op { op: Opcode::Assign { target: counter, value: self.int_lit(0) }, next: head }))
    }

    /// Desugars `ForEach var in iterable: body` into materializing the
    /// iterable once (characters for a string, elements for a sequence),
    /// then an indexed `While`, per spec.md §4.4 and the resolved open
    /// question on re-evaluating a mutated iterable mid-loop (it is not:
    /// the cache is fixed at loop entry).
    fn lower_for_each(
        &mut self,
        var: Symbol,
        iterable: &'a Expr<'a>,
        body: Block<'a>,
        succ: NodeId,
    ) -> Result<NodeId, VyraError> {
        let cache = self.fresh_symbol("foreach_cache");
        let index = self.fresh_symbol("foreach_index");
        let length_sym = self.interner.intern("length");

        let head = self.reserve();
        let incr = self.reserve();
        let bind = self.reserve();

        self.loop_stack.push(LoopCtx { break_target: succ, continue_target: incr });
        let body_start = self.lower_block(body, incr);
        self.loop_stack.pop();
        let body_start = body_start?;

        let incr_value = self.binary(BinaryOp::Add, self.ident(index), self.int_lit(1));
        self.fill(incr, Node::Op { op: Opcode::Assign { target: index, value: incr_value }, next: body_start });

        let elem = self.ctx.alloc_expr(Expr::Index { sequence: self.ident(cache), index: self.ident(index), span: Span::EMPTY });
        self.fill(bind, Node::Op { op: Opcode::Assign { target: var, value: elem }, next: incr });

        let length_call = self.call(length_sym, &[self.ident(cache)]);
        let cond = self.binary(BinaryOp::Lt, self.ident(index), length_call);
        self.fill(head, Node::Branch { cond, then_next: bind, else_next: succ, is_loop: true });

        let init_index =
            self.push(Node::Op { op: Opcode::Assign { target: index, value: self.int_lit(0) }, next: head });
        Ok(self.push(Node::Op { op: Opcode::ForEachInit { cache, source: iterable }, next: init_index }))
    }
}

fn loop_control_error(keyword: &str) -> VyraError {
    VyraError::Parse {
        span: Span::EMPTY,
        detail: ParseFailure::LoopControlOutsideLoop { keyword: keyword.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ast::Stmt;

    fn ctx_arenas<'a>() -> (
        Arena<Expr<'a>>,
        Arena<Stmt<'a>>,
        Arena<&'a Expr<'a>>,
        Arena<&'a Stmt<'a>>,
        Arena<ElifArm<'a>>,
        Arena<Symbol>,
    ) {
        (Arena::new(), Arena::new(), Arena::new(), Arena::new(), Arena::new(), Arena::new())
    }

    #[test]
    fn display_statement_lowers_to_a_single_op_node() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let value = ctx.alloc_expr(Expr::Literal(Literal::Int(1)));
        let display = ctx.alloc_stmt(Stmt::Display { value });
        let program = ctx.alloc_stmts([display as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let graph = builder.build_program(program).unwrap();

        match graph.node(graph.entry) {
            Node::Op { op: Opcode::Display { .. }, next } => {
                assert!(matches!(graph.node(*next), Node::Halt));
            }
            other => panic!("expected Display op, got {:?}", other),
        }
    }

    #[test]
    fn while_loop_head_branches_back_into_its_own_body() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let cond = ctx.alloc_expr(Expr::Literal(Literal::Bool(true)));
        let body_stmt = ctx.alloc_stmt(Stmt::Break);
        let body = ctx.alloc_stmts([body_stmt as &Stmt]);
        let while_stmt = ctx.alloc_stmt(Stmt::While { cond, body });
        let program = ctx.alloc_stmts([while_stmt as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let graph = builder.build_program(program).unwrap();

        match graph.node(graph.entry) {
            Node::Branch { else_next, .. } => {
                assert!(matches!(graph.node(*else_next), Node::Halt));
            }
            other => panic!("expected Branch, got {:?}", other),
        }
    }

    #[test]
    fn repeat_desugars_into_counter_init_then_branch() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let count = ctx.alloc_expr(Expr::Literal(Literal::Int(3)));
        let body_stmt = ctx.alloc_stmt(Stmt::Continue);
        let body = ctx.alloc_stmts([body_stmt as &Stmt]);
        let repeat_stmt = ctx.alloc_stmt(Stmt::Repeat { count, body });
        let program = ctx.alloc_stmts([repeat_stmt as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let graph = builder.build_program(program).unwrap();

        match graph.node(graph.entry) {
            Node::Op { op: Opcode::Assign { .. }, next } => {
                assert!(matches!(graph.node(*next), Node::Branch { .. }));
            }
            other => panic!("expected counter init op, got {:?}", other),
        }
    }

    #[test]
    fn function_def_registers_a_function_record_and_contributes_no_node() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let name = interner.intern("greet");
        let return_stmt = ctx.alloc_stmt(Stmt::Return { value: None });
        let body = ctx.alloc_stmts([return_stmt as &Stmt]);
        let func_def = ctx.alloc_stmt(Stmt::FunctionDef { name, params: &[], body });
        let program = ctx.alloc_stmts([func_def as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let graph = builder.build_program(program).unwrap();

        assert!(graph.functions.contains_key(&name));
        assert!(matches!(graph.node(graph.entry), Node::Halt));
    }

    #[test]
    fn break_outside_any_loop_is_a_parse_error_not_a_panic() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let break_stmt = ctx.alloc_stmt(Stmt::Break);
        let program = ctx.alloc_stmts([break_stmt as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let err = builder.build_program(program).unwrap_err();
        assert!(matches!(
            err,
            VyraError::Parse { detail: ParseFailure::LoopControlOutsideLoop { .. }, .. }
        ));
    }

    #[test]
    fn continue_outside_any_loop_is_a_parse_error_not_a_panic() {
        let (exprs, stmts, expr_lists, stmt_lists, elif_arms, syms) = ctx_arenas();
        let ctx = AstContext::new(&exprs, &stmts, &expr_lists, &stmt_lists, &elif_arms, &syms);
        let mut interner = Interner::new();
        let continue_stmt = ctx.alloc_stmt(Stmt::Continue);
        let then_block = ctx.alloc_stmts([continue_stmt as &Stmt]);
        let cond = ctx.alloc_expr(Expr::Literal(Literal::Bool(true)));
        let if_stmt = ctx.alloc_stmt(Stmt::If { cond, then_block, elifs: &[], else_block: None });
        let program = ctx.alloc_stmts([if_stmt as &Stmt]);

        let builder = GraphBuilder::new(ctx, &mut interner);
        let err = builder.build_program(program).unwrap_err();
        assert!(matches!(
            err,
            VyraError::Parse { detail: ParseFailure::LoopControlOutsideLoop { .. }, .. }
        ));
    }
}
