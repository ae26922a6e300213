//! Append-only page log.

use std::cell::RefCell;
use std::rc::Rc;

/// Where log lines end up (the visible log region in the page).
pub trait LogSink {
    fn append(&self, line: &str);
}

/// Writes each line to the sink and mirrors it as a `tracing` event.
#[derive(Clone)]
pub struct Logger {
    sink: Rc<dyn LogSink>,
}

impl Logger {
    pub fn new(sink: Rc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, line: &str) {
        tracing::info!(target: "locator", "{line}");
        self.sink.append(line);
    }

    pub fn warn(&self, line: &str) {
        tracing::warn!(target: "locator", "{line}");
        self.sink.append(line);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// In-memory sink; never cleared, never capped.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: RefCell<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLog {
    fn append(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
