//! Line-oriented I/O port used by the built-ins.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub trait Io {
    /// Emit one line of program output.
    fn output(&mut self, line: &str);

    /// Read one line without its terminator. `None` at end of input.
    fn input(&mut self) -> Option<String>;
}

// ─── Stdio ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StdIo;

impl Io for StdIo {
    fn output(&mut self, line: &str) {
        let mut out = std::io::stdout().lock();
        // a closed stdout is not a program error
        let _ = writeln!(out, "{line}");
    }

    fn input(&mut self) -> Option<String> {
        let mut buf = String::new();
        match std::io::stdin().lock().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let trimmed = buf.trim_end_matches(['\n', '\r']).len();
                buf.truncate(trimmed);
                Some(buf)
            }
        }
    }
}

// ─── Buffer ───────────────────────────────────────────────────────────────────

/// Scripted input and captured output, for tests and embedding.
#[derive(Debug, Default)]
pub struct BufferIo {
    inputs: VecDeque<String>,
    output: Vec<String>,
}

impl BufferIo {
    pub fn new() -> Self { Self::default() }

    pub fn with_input<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { inputs: inputs.into_iter().map(Into::into).collect(), output: Vec::new() }
    }

    pub fn lines(&self) -> &[String] { &self.output }

    pub fn into_lines(self) -> Vec<String> { self.output }
}

impl Io for BufferIo {
    fn output(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn input(&mut self) -> Option<String> {
        self.inputs.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_round_trips_lines() {
        let mut io = BufferIo::with_input(["a", "b"]);
        io.output("first");
        assert_eq!(io.input().as_deref(), Some("a"));
        assert_eq!(io.input().as_deref(), Some("b"));
        assert_eq!(io.input(), None);
        assert_eq!(io.lines(), ["first".to_string()]);
    }
}
