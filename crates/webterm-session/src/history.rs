//! Submitted command history with a recall cursor.

use std::collections::VecDeque;

/// Ordered command history, oldest first.
///
/// The cursor counts back from the newest entry: `Some(0)` is the most
/// recent command, `None` means the user is not navigating.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    limit: usize,
}

impl CommandHistory {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `limit` entries (`0` = unbounded).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record a submitted command and stop navigating.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_back(entry.into());
        if self.limit > 0 {
            while self.entries.len() > self.limit {
                self.entries.pop_front();
            }
        }
        self.cursor = None;
    }

    /// Step toward older entries. Stays on the oldest entry once reached.
    ///
    /// Returns `None` only when the history is empty.
    pub fn older(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        let cursor = self.cursor.map_or(0, |c| (c + 1).min(last));
        self.cursor = Some(cursor);
        self.entry_at(cursor)
    }

    /// Step toward newer entries.
    ///
    /// Returns `None` once the cursor moves past the newest entry.
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            None | Some(0) => {
                self.cursor = None;
                None
            }
            Some(c) => {
                self.cursor = Some(c - 1);
                self.entry_at(c - 1)
            }
        }
    }

    /// Stop navigating.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Current cursor.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    fn entry_at(&self, cursor: usize) -> Option<&str> {
        let index = self.entries.len().checked_sub(1 + cursor)?;
        self.entries.get(index).map(String::as_str)
    }
}
