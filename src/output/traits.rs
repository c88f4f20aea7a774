//! Output sink trait and implementations
//!
//! `print` and `raw` actions write their results through an [`OutputSink`]
//! so the binary can stream them to stdout while tests capture them.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Destination for extracted results
pub trait OutputSink: Send + Sync {
    /// Emits one result line
    fn emit(&self, line: &str);
}

/// Writes every result as a line on standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = writeln!(handle, "{}", line) {
            tracing::warn!("Failed to write result to stdout: {}", e);
        }
    }
}

/// Keeps results in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
