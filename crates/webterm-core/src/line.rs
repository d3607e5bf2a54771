//! Typed transcript lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Input echoed with the prompt it was typed at
    Command,
    /// Raw shell output
    Output,
    /// Connection or remote failure
    Error,
    /// Client-side notice (connecting, cleared, closed)
    System,
}

/// One immutable entry in the session transcript.
///
/// Fields are private so a line cannot change after it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLine {
    text: String,
    kind: LineKind,
    timestamp: DateTime<Utc>,
}

impl TerminalLine {
    /// Create a line stamped with the current time.
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self::at(kind, text, Utc::now())
    }

    /// Create a line with an explicit timestamp.
    pub fn at(kind: LineKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp,
        }
    }

    /// Command line.
    pub fn command(text: impl Into<String>) -> Self {
        Self::new(LineKind::Command, text)
    }

    /// Output line.
    pub fn output(text: impl Into<String>) -> Self {
        Self::new(LineKind::Output, text)
    }

    /// Error line.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LineKind::Error, text)
    }

    /// System line.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(LineKind::System, text)
    }

    /// Line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line kind.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// When the line was appended.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
