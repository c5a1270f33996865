//! The execution engine (spec.md §4.5): walks a `Graph`, node by node,
//! dispatching each `Opcode` against a `Scopes` chain. I/O is injected
//! through the `Io` trait rather than touching `stdin`/`stdout` directly,
//! so the REPL and integration tests can both drive the same engine
//! against buffers instead of a real terminal.

use std::fs;
use std::io::{self, BufRead, Write};

use crate::ast::AskKind;
use crate::error::{Span, VyraError};
use crate::eval::eval_expr;
use crate::graph::{FunctionRecord, Graph, Node, NodeId, Opcode};
use crate::intern::Interner;
use crate::scope::{Frame, Scopes};
use crate::value::Value;

/// Runaway-loop guard: a program that enters a loop body more than this
/// many times raises `IterationLimitExceeded` instead of hanging forever.
pub const DEFAULT_ITERATION_LIMIT: u64 = 1_000_000;

/// Abstracts over where `Display`/`Ask` read and write, so the same
/// interpreter drives a file run, the REPL, and tests without a real
/// terminal.
pub trait Io {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn write(&mut self, text: &str) -> io::Result<()>;
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The real-terminal `Io` implementation, used by the `run`/`repl` CLI
/// subcommands.
pub struct StdIo {
    stdin: io::Stdin,
}

impl StdIo {
    pub fn new() -> Self {
        StdIo { stdin: io::stdin() }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        Self::new()
    }
}

impl Io for StdIo {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        println!("{}", line);
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        print!("{}", text);
        io::stdout().flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        let n = self.stdin.lock().read_line(&mut buf)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf.trim_end_matches(['\n', '\r']).to_string()))
        }
    }
}

pub struct Interpreter<'a> {
    graph: &'a Graph<'a>,
    scopes: Scopes,
    interner: &'a Interner,
    iteration_limit: u64,
    iterations: u64,
}

impl<'a> Interpreter<'a> {
    pub fn new(graph: &'a Graph<'a>, interner: &'a Interner) -> Self {
        Interpreter {
            graph,
            scopes: Scopes::new(),
            interner,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            iterations: 0,
        }
    }

    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// Exposes the final global scope, mainly so the REPL can keep state
    /// alive across successive inputs.
    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    pub fn run(&mut self, io: &mut dyn Io) -> Result<(), VyraError> {
        self.run_from(self.graph.entry, io)
    }

    /// Runs starting from an arbitrary node, used by the REPL to re-enter
    /// the same graph at a freshly lowered top-level statement while
    /// keeping `self.scopes` (so earlier `Assign`s stay visible).
    pub fn run_from(&mut self, start: NodeId, io: &mut dyn Io) -> Result<(), VyraError> {
        let mut current = start;
        while let Some(next) = self.step_from(current, io)? {
            current = next;
        }
        Ok(())
    }

    /// Executes exactly one node starting at `current`, returning the next
    /// node to run or `None` if the program just halted (a `Halt` node, or
    /// a `Return`/`FuncExit` with no frame left to pop into). Used by
    /// `run_from` and by `--debug` tracing, which needs to log between
    /// individual steps.
    pub fn step_from(&mut self, current: NodeId, io: &mut dyn Io) -> Result<Option<NodeId>, VyraError> {
        match self.graph.node(current) {
            Node::Halt => Ok(None),
            Node::FuncExit => Ok(self.pop_frame_and_return(Value::Absent)),
            Node::Branch { cond, then_next, else_next, is_loop } => {
                let taken = eval_expr(cond, &self.scopes, self.interner)?.is_truthy();
                if taken {
                    if *is_loop {
                        self.iterations += 1;
                        if self.iterations > self.iteration_limit {
                            return Err(VyraError::IterationLimitExceeded {
                                span: Span::EMPTY,
                                limit: self.iteration_limit,
                            });
                        }
                    }
                    Ok(Some(*then_next))
                } else {
                    Ok(Some(*else_next))
                }
            }
            Node::Op { op, next } => {
                let next = *next;
                self.exec_op(op, next, io)
            }
        }
    }

    /// Executes one `Op` node, returning the next node to run or `None` if
    /// a top-level `Return` just popped the last call frame — that halts
    /// the run the same way a bare `Halt` node or `FuncExit` with no frame
    /// left does, rather than falling through to `next`.
    fn exec_op(&mut self, op: &Opcode<'_>, next: NodeId, io: &mut dyn Io) -> Result<Option<NodeId>, VyraError> {
        match op {
            Opcode::Assign { target, value } => {
                let v = eval_expr(value, &self.scopes, self.interner)?;
                self.scopes.assign(*target, v);
                Ok(Some(next))
            }
            Opcode::Display { value } => {
                let v = eval_expr(value, &self.scopes, self.interner)?;
                io.write_line(&v.to_display_string()).map_err(io_error)?;
                Ok(Some(next))
            }
            Opcode::Ask { target, kind, prompt } => {
                if let Some(p) = prompt {
                    io.write(p).map_err(io_error)?;
                }
                let line = io.read_line().map_err(io_error)?.unwrap_or_default();
                let value = match kind {
                    AskKind::Text => Value::Text(line),
                    AskKind::Number => parse_number(&line)?,
                };
                self.scopes.assign(*target, value);
                Ok(Some(next))
            }
            Opcode::ListAppend { target, value } => {
                let v = eval_expr(value, &self.scopes, self.interner)?;
                match self.scopes.get(*target) {
                    Some(Value::Sequence(items)) => {
                        items.borrow_mut().push(v);
                        Ok(Some(next))
                    }
                    Some(other) => Err(VyraError::Type {
                        span: Span::EMPTY,
                        message: format!("cannot append to {}", other.type_name()),
                    }),
                    None => Err(VyraError::Name {
                        span: Span::EMPTY,
                        identifier: self.interner.resolve(*target).to_string(),
                    }),
                }
            }
            Opcode::ReadFile { path, target } => {
                let path_val = eval_expr(path, &self.scopes, self.interner)?;
                let path_str = path_val.to_display_string();
                let contents = fs::read_to_string(&path_str)
                    .map_err(|e| VyraError::Io { message: format!("reading \"{}\": {}", path_str, e) })?;
                self.scopes.assign(*target, Value::Text(contents));
                Ok(Some(next))
            }
            Opcode::WriteFile { value, path } => {
                let v = eval_expr(value, &self.scopes, self.interner)?;
                let path_val = eval_expr(path, &self.scopes, self.interner)?;
                let path_str = path_val.to_display_string();
                fs::write(&path_str, v.to_display_string())
                    .map_err(|e| VyraError::Io { message: format!("writing \"{}\": {}", path_str, e) })?;
                Ok(Some(next))
            }
            Opcode::ForEachInit { cache, source } => {
                let v = eval_expr(source, &self.scopes, self.interner)?;
                let materialized = match v {
                    Value::Sequence(items) => items.borrow().clone(),
                    Value::Text(s) => s.chars().map(|c| Value::Text(c.to_string())).collect(),
                    other => {
                        return Err(VyraError::Type {
                            span: Span::EMPTY,
                            message: format!("cannot iterate over {}", other.type_name()),
                        })
                    }
                };
                self.scopes.assign(*cache, Value::sequence(materialized));
                Ok(Some(next))
            }
            Opcode::Call { name, args, result_target } => {
                Ok(Some(self.exec_call(*name, args, *result_target, next)?))
            }
            Opcode::Return { value } => {
                let v = match value {
                    Some(e) => eval_expr(e, &self.scopes, self.interner)?,
                    None => Value::Absent,
                };
                Ok(self.pop_frame_and_return(v))
            }
        }
    }

    fn exec_call(
        &mut self,
        name: crate::intern::Symbol,
        args: &[&crate::ast::Expr<'_>],
        result_target: Option<crate::intern::Symbol>,
        next: NodeId,
    ) -> Result<NodeId, VyraError> {
        let FunctionRecord { params, entry } = match self.graph.functions.get(&name) {
            Some(f) => f,
            None => {
                return Err(VyraError::Name { span: Span::EMPTY, identifier: self.interner.resolve(name).to_string() })
            }
        };
        if params.len() != args.len() {
            return Err(VyraError::Arity {
                span: Span::EMPTY,
                function: self.interner.resolve(name).to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(eval_expr(arg, &self.scopes, self.interner)?);
        }
        let entry = *entry;
        let params = *params;

        self.scopes.push_frame(Frame::new(next, result_target));
        let frame = self.scopes.frames.last_mut().expect("just pushed");
        for (param, value) in params.iter().zip(values) {
            frame.locals.insert(*param, value);
        }
        Ok(entry)
    }

    /// Pops the active frame, binds its result in the caller's scope if
    /// requested, and returns where execution resumes. `None` means there
    /// was no frame to pop (a top-level `Return`/fall-off, which simply
    /// ends the run).
    fn pop_frame_and_return(&mut self, value: Value) -> Option<NodeId> {
        if self.scopes.frames.is_empty() {
            return None;
        }
        let result_target = self.scopes.frames.last().expect("checked non-empty above").result_target;
        if let Some(target) = result_target {
            self.scopes.assign_in_caller(target, value);
        }
        let frame = self.scopes.pop_frame()?;
        Some(frame.return_target)
    }
}

fn parse_number(s: &str) -> Result<Value, VyraError> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        Ok(Value::Int(n))
    } else if let Ok(f) = trimmed.parse::<f64>() {
        Ok(Value::Float(f))
    } else {
        Err(VyraError::Type { span: Span::EMPTY, message: format!("\"{}\" is not a number", s) })
    }
}

fn io_error(e: io::Error) -> VyraError {
    VyraError::Io { message: e.to_string() }
}
