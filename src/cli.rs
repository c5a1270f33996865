//! Command-line interface (spec.md §6): argument parsing and subcommand
//! dispatch for the `vyra` binary, built on [`clap`] the way the teacher's
//! `largo` CLI is.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::VyraError;
use crate::interpreter::{Interpreter, Io, StdIo};
use crate::{build_graph, source, visualize_graph, Arenas};

/// Command-line interface for the Vyra interpreter.
#[derive(Parser)]
#[command(name = "vyra")]
#[command(about = "Interpreter for Vyra, a restricted-English imperative language")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands (spec.md §6).
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a program.
    Run {
        /// Path to the Vyra source file.
        file: PathBuf,

        /// Print each executed node to standard error as it runs.
        #[arg(long)]
        debug: bool,

        /// Write a flat text dump of the logic graph to this path instead
        /// of a rendered diagram (spec.md §3 Non-goals).
        #[arg(long)]
        viz: Option<PathBuf>,

        /// Rewrite the source through the optional AI front end before
        /// parsing (spec.md §4.6). Requires the `ai` feature and its
        /// environment variables.
        #[arg(long)]
        ai: bool,

        /// Override the loop-iteration watchdog ceiling.
        #[arg(long)]
        iteration_limit: Option<u64>,
    },

    /// Parse a program and print its logic graph without executing it.
    Parse {
        /// Path to the Vyra source file.
        file: PathBuf,

        /// Rewrite the source through the optional AI front end first.
        #[arg(long)]
        ai: bool,
    },

    /// Start an interactive read-sentence-execute loop sharing one
    /// top-level scope across lines.
    Repl {
        /// Rewrite each line through the optional AI front end first.
        #[arg(long)]
        ai: bool,
    },
}

pub fn run_cli() -> Result<(), VyraError> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { file, debug, viz, ai, iteration_limit } => cmd_run(&file, debug, viz.as_deref(), ai, iteration_limit),
        Commands::Parse { file, ai } => cmd_parse(&file, ai),
        Commands::Repl { ai } => cmd_repl(ai),
    }
}

fn read_source(path: &std::path::Path, ai: bool) -> Result<String, VyraError> {
    let loaded = source::load_program(path)?;
    if ai {
        #[cfg(feature = "ai")]
        {
            return crate::ai::rewrite(&loaded);
        }
        #[cfg(not(feature = "ai"))]
        {
            return Err(VyraError::AiRewrite {
                message: "--ai was passed but this binary was built without the `ai` feature".to_string(),
            });
        }
    }
    Ok(loaded)
}

fn cmd_run(
    file: &std::path::Path,
    debug: bool,
    viz: Option<&std::path::Path>,
    ai: bool,
    iteration_limit: Option<u64>,
) -> Result<(), VyraError> {
    let text = read_source(file, ai)?;
    let arenas = Arenas::new();
    let ctx = arenas.ctx();
    let mut interner = crate::intern::Interner::new();
    let graph = build_graph(&text, ctx, &mut interner)?;

    if let Some(viz_path) = viz {
        let dump = visualize_graph(&graph, &interner);
        fs::write(viz_path, dump).map_err(|e| VyraError::Io { message: e.to_string() })?;
    }

    let mut interpreter = Interpreter::new(&graph, &interner);
    if let Some(limit) = iteration_limit {
        interpreter = interpreter.with_iteration_limit(limit);
    }
    let mut io = StdIo::new();
    if debug {
        run_with_debug_trace(&graph, &mut interpreter, &mut io)
    } else {
        interpreter.run(&mut io)
    }
}

/// `--debug` prints each executed node to standard error (spec.md §6).
/// The interpreter itself has no tracing hook, so this walks the same
/// graph one node at a time using `run_from`, logging between steps.
fn run_with_debug_trace(
    graph: &crate::graph::Graph<'_>,
    interpreter: &mut Interpreter<'_>,
    io: &mut dyn Io,
) -> Result<(), VyraError> {
    let mut current = graph.entry;
    loop {
        eprintln!("debug: node {}", current);
        if matches!(graph.node(current), crate::graph::Node::Halt) {
            return Ok(());
        }
        match interpreter.step_from(current, io)? {
            Some(n) => current = n,
            None => return Ok(()),
        }
    }
}

fn cmd_parse(file: &std::path::Path, ai: bool) -> Result<(), VyraError> {
    let text = read_source(file, ai)?;
    let arenas = Arenas::new();
    let ctx = arenas.ctx();
    let mut interner = crate::intern::Interner::new();
    let graph = build_graph(&text, ctx, &mut interner)?;
    println!("{}", visualize_graph(&graph, &interner));
    Ok(())
}

fn cmd_repl(ai: bool) -> Result<(), VyraError> {
    println!("vyra repl -- enter one sentence at a time, Ctrl-D to exit");
    let stdin = io::stdin();
    let mut interner = crate::intern::Interner::new();
    let mut scopes = crate::scope::Scopes::new();
    let mut io = StdIo::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        let n = stdin.lock().read_line(&mut line).map_err(|e| VyraError::Io { message: e.to_string() })?;
        if n == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let text = if ai {
            #[cfg(feature = "ai")]
            {
                crate::ai::rewrite(line)?
            }
            #[cfg(not(feature = "ai"))]
            {
                return Err(VyraError::AiRewrite {
                    message: "--ai was passed but this binary was built without the `ai` feature".to_string(),
                });
            }
        } else {
            line.to_string()
        };

        let arenas = Arenas::new();
        let ctx = arenas.ctx();
        match build_graph(&text, ctx, &mut interner) {
            Ok(graph) => {
                let mut interpreter = Interpreter::new(&graph, &interner);
                *interpreter.scopes_mut() = std::mem::take(&mut scopes);
                if let Err(e) = interpreter.run(&mut io) {
                    eprintln!("Error: {}", e.display_with_source(&text));
                }
                scopes = std::mem::take(interpreter.scopes_mut());
            }
            Err(e) => eprintln!("Error: {}", e.display_with_source(&text)),
        }
    }
}
