//! Chunk classification: raw bridge output to transcript lines.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use webterm_core::{DetectionSettings, Result, TerminalLine};

use crate::detection::PromptPipeline;
use crate::segment::{split_prompt_line, PromptSegments};

lazy_static! {
    static ref CONTROL_SEQUENCE: Regex = Regex::new(
        r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[()][0-9A-Za-z]|\x1b[=>78DEHMc]"
    )
    .unwrap();
}

/// Remove ANSI escape sequences, carriage returns and bells.
///
/// ```
/// use webterm_detector::strip_control_sequences;
///
/// assert_eq!(strip_control_sequences("\x1b[01;32mok\x1b[0m\r\n"), "ok\n");
/// ```
pub fn strip_control_sequences(raw: &str) -> Cow<'_, str> {
    let stripped = CONTROL_SEQUENCE.replace_all(raw, "");
    if stripped.contains(['\r', '\x07']) {
        Cow::Owned(stripped.replace(['\r', '\x07'], ""))
    } else {
        stripped
    }
}

/// Result of classifying one inbound chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Prompt recognized in the chunk, normalized
    pub prompt: Option<String>,
    /// Line to append; `None` when the chunk is a bare prompt echo
    pub line: Option<TerminalLine>,
}

impl ChunkOutcome {
    /// Whether the chunk was dropped.
    pub fn is_suppressed(&self) -> bool {
        self.line.is_none()
    }
}

/// Turns raw output chunks into typed lines and tracks prompt changes.
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    pipeline: PromptPipeline,
}

impl LineClassifier {
    /// Classifier over the given strategies.
    pub fn new(pipeline: PromptPipeline) -> Self {
        Self { pipeline }
    }

    /// Classifier with built-in and configured strategies.
    pub fn from_settings(settings: &DetectionSettings) -> Result<Self> {
        Ok(Self::new(PromptPipeline::from_settings(settings)?))
    }

    /// The strategy pipeline.
    pub fn pipeline(&self) -> &PromptPipeline {
        &self.pipeline
    }

    /// Classify one chunk.
    ///
    /// A chunk whose trimmed content is exactly the newly detected prompt is
    /// suppressed. Every other non-empty chunk becomes a single `Output` line.
    pub fn classify(&self, chunk: &str) -> ChunkOutcome {
        let text = strip_control_sequences(chunk);
        let prompt = self.pipeline.detect(&text).map(|m| m.prompt);

        let is_prompt_echo = prompt
            .as_deref()
            .is_some_and(|p| text.trim() == p.trim());

        let line = if is_prompt_echo || text.is_empty() {
            trace!(bytes = chunk.len(), "chunk suppressed");
            None
        } else {
            Some(TerminalLine::output(text.trim_end_matches('\n')))
        };

        ChunkOutcome { prompt, line }
    }

    /// Split a line that begins with a recognizable prompt.
    pub fn segment<'a>(&self, line: &'a str) -> Option<PromptSegments<'a>> {
        let first = line.lines().next()?;
        let found = self.pipeline.detect(first).filter(|m| m.start == 0)?;
        split_prompt_line(line, &first[..found.end])
    }
}
