//! Interpreter for Vyra, a restricted-English imperative language.
//!
//! # Pipeline
//!
//! ```text
//! source reader -> sentence splitter -> parser -> graph builder -> interpreter
//! ```
//!
//! # Library usage
//!
//! ```no_run
//! use vyra::{run_source, RunOptions};
//! use vyra::interpreter::StdIo;
//!
//! let source = "Display \"hello\".".to_string();
//! let mut io = StdIo::new();
//! run_source(&source, RunOptions::default(), &mut io).unwrap();
//! ```

#[cfg(feature = "ai")]
pub mod ai;
pub mod arena;
pub mod arena_ctx;
pub mod ast;
pub mod builtins;
pub mod cli;
pub mod error;
pub mod eval;
pub mod graph;
pub mod intern;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod source;
pub mod splitter;
pub mod value;

use arena::Arena;
use arena_ctx::AstContext;
use ast::{stmt::ElifArm, Expr, Stmt};
use error::VyraError;
use graph::{Graph, GraphBuilder};
use intern::{Interner, Symbol};
use interpreter::{Interpreter, Io};

/// Knobs that affect a single run, gathered in one place so the CLI, REPL,
/// and tests all configure a run the same way instead of threading loose
/// booleans through `run_source`'s signature.
#[derive(Default, Clone)]
pub struct RunOptions {
    pub iteration_limit: Option<u64>,
    pub debug: bool,
}

/// Arenas a single parse/build pass allocates into. Bundled so callers that
/// need the parsed `Block`/`Graph` to outlive `run_source` (the REPL does)
/// can own this instead of five loose `Arena` locals.
#[derive(Default)]
pub struct Arenas<'a> {
    pub exprs: Arena<Expr<'a>>,
    pub stmts: Arena<Stmt<'a>>,
    pub expr_lists: Arena<&'a Expr<'a>>,
    pub stmt_lists: Arena<&'a Stmt<'a>>,
    pub elif_arms: Arena<ElifArm<'a>>,
    pub syms: Arena<Symbol>,
}

impl<'a> Arenas<'a> {
    pub fn new() -> Self {
        Arenas::default()
    }

    pub fn ctx(&'a self) -> AstContext<'a> {
        AstContext::new(&self.exprs, &self.stmts, &self.expr_lists, &self.stmt_lists, &self.elif_arms, &self.syms)
    }
}

/// Parses `source` and lowers it to a logic graph, without running it.
/// Exposed separately from `run_source` so `--viz` and `parse` can inspect
/// the graph without executing it.
pub fn build_graph<'a>(
    source: &str,
    ctx: AstContext<'a>,
    interner: &mut Interner,
) -> Result<Graph<'a>, VyraError> {
    let program = parser::parse_program(source, &ctx, interner)?;
    let builder = GraphBuilder::new(ctx, interner);
    builder.build_program(program)
}

/// Parses, lowers, and executes `source` to completion against `io`.
pub fn run_source(source: &str, options: RunOptions, io: &mut dyn Io) -> Result<(), VyraError> {
    let arenas = Arenas::new();
    let ctx = arenas.ctx();
    let mut interner = Interner::new();
    let graph = build_graph(source, ctx, &mut interner)?;

    let mut interpreter = Interpreter::new(&graph, &interner);
    if let Some(limit) = options.iteration_limit {
        interpreter = interpreter.with_iteration_limit(limit);
    }
    interpreter.run(io)
}

/// A flat, indented text dump of a graph's nodes, used by `--viz` (spec.md
/// §3 Non-goals rule out a rendered diagram; this is the "as a flat list"
/// form it explicitly keeps in scope).
pub fn visualize_graph(graph: &Graph<'_>, interner: &Interner) -> String {
    let mut out = String::new();
    out.push_str(&format!("entry: {}\n", graph.entry));
    for (id, node) in graph.nodes.iter().enumerate() {
        out.push_str(&format!("{:>4}: {}\n", id, describe_node(node)));
    }
    if !graph.functions.is_empty() {
        out.push_str("functions:\n");
        let mut names: Vec<&Symbol> = graph.functions.keys().collect();
        names.sort_by_key(|s| s.index());
        for name in names {
            let record = &graph.functions[name];
            out.push_str(&format!("  {} -> entry {}\n", interner.resolve(*name), record.entry));
        }
    }
    out
}

fn describe_node(node: &graph::Node<'_>) -> String {
    match node {
        graph::Node::Halt => "Halt".to_string(),
        graph::Node::FuncExit => "FuncExit".to_string(),
        graph::Node::Branch { then_next, else_next, is_loop, .. } => {
            format!("Branch{{then: {}, else: {}, loop: {}}}", then_next, else_next, is_loop)
        }
        graph::Node::Op { op, next } => format!("{} -> {}", describe_op(op), next),
    }
}

fn describe_op(op: &graph::Opcode<'_>) -> String {
    match op {
        graph::Opcode::Assign { .. } => "Assign".to_string(),
        graph::Opcode::Display { .. } => "Display".to_string(),
        graph::Opcode::Ask { .. } => "Ask".to_string(),
        graph::Opcode::ListAppend { .. } => "ListAppend".to_string(),
        graph::Opcode::ReadFile { .. } => "ReadFile".to_string(),
        graph::Opcode::WriteFile { .. } => "WriteFile".to_string(),
        graph::Opcode::Call { .. } => "Call".to_string(),
        graph::Opcode::Return { .. } => "Return".to_string(),
        graph::Opcode::ForEachInit { .. } => "ForEachInit".to_string(),
    }
}
