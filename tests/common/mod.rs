//! Shared scaffolding for the integration tests in this directory: a
//! buffer-backed `Io` so a scenario's stdout can be asserted against
//! without touching a real terminal, plus a couple of `run_source`
//! wrappers the individual `tests/*.rs` files build on.

use std::io;

use vyra::error::VyraError;
use vyra::interpreter::Io;
use vyra::{run_source, RunOptions};

#[derive(Default)]
pub struct BufferIo {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

impl BufferIo {
    pub fn with_input<I: IntoIterator<Item = &'static str>>(lines: I) -> Self {
        BufferIo { input: lines.into_iter().map(str::to_string).collect(), output: Vec::new() }
    }

    pub fn stdout(&self) -> String {
        self.output.join("")
    }
}

impl Io for BufferIo {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(format!("{}\n", line));
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        if self.input.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.input.remove(0)))
        }
    }
}

/// Runs `source` to completion and returns everything written through
/// `Display`/`Ask`'s prompt, concatenated in order.
pub fn run_and_capture(source: &str) -> Result<String, VyraError> {
    let mut io = BufferIo::default();
    run_source(source, RunOptions::default(), &mut io)?;
    Ok(io.stdout())
}

/// Same as [`run_and_capture`], but feeds `input` lines to `Ask`/input
/// statements as they're requested.
pub fn run_with_input(source: &str, input: Vec<&'static str>) -> Result<String, VyraError> {
    let mut io = BufferIo::with_input(input);
    run_source(source, RunOptions::default(), &mut io)?;
    Ok(io.stdout())
}
