//! Bounded rolling text log.
//!
//! Holds the last few human-readable coordination events (negotiations,
//! invariant violations) for status displays.  Structured diagnostics go
//! through `tracing`; this log is the operator-facing summary.

use std::collections::VecDeque;

/// FIFO of at most `capacity` lines; pushing beyond capacity drops the oldest.
#[derive(Clone, Debug)]
pub struct EventLog {
    lines:    VecDeque<String>,
    capacity: usize,
}

impl EventLog {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// Oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
