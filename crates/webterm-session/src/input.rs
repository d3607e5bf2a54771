//! Input buffer with history recall.

use crate::history::CommandHistory;

/// The line being edited plus the history it recalls from.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: String,
    history: CommandHistory,
}

impl InputController {
    /// Create a controller with an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller keeping at most `limit` history entries (`0` = unbounded).
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            history: CommandHistory::with_limit(limit),
        }
    }

    /// Current buffer contents.
    pub fn input(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer contents.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Submitted commands.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Record a submitted command and reset the buffer and cursor.
    pub fn commit(&mut self, command: &str) {
        self.history.push(command);
        self.buffer.clear();
    }

    /// Load the next older history entry. No-op on empty history.
    pub fn recall_previous(&mut self) -> &str {
        if let Some(entry) = self.history.older() {
            self.buffer = entry.to_string();
        }
        &self.buffer
    }

    /// Load the next newer history entry, or clear the buffer past the newest.
    pub fn recall_next(&mut self) -> &str {
        match self.history.newer() {
            Some(entry) => self.buffer = entry.to_string(),
            None => self.buffer.clear(),
        }
        &self.buffer
    }
}
