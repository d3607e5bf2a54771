//! Text rendering of transcript lines and session status.

use webterm_core::{LineKind, TerminalLine};
use webterm_detector::{parse_listing_line, LineClassifier, ListingLine};
use webterm_session::Session;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";

/// Formats lines for a terminal, with or without color.
#[derive(Debug, Clone)]
pub struct Renderer {
    classifier: LineClassifier,
    color: bool,
}

impl Renderer {
    /// Create a renderer segmenting prompts with `classifier`.
    pub fn new(classifier: LineClassifier, color: bool) -> Self {
        Self { classifier, color }
    }

    /// Render one transcript line. Multi-line output stays multi-line.
    pub fn render(&self, line: &TerminalLine) -> String {
        match line.kind() {
            LineKind::Command => self.render_command(line.text()),
            LineKind::Output => self.render_output(line.text()),
            LineKind::Error => self.error(line.text()),
            LineKind::System => self.paint(
                DIM,
                &format!("[{}] {}", line.timestamp().format("%H:%M:%S"), line.text()),
            ),
        }
    }

    /// Render a locally reported error.
    pub fn error(&self, message: &str) -> String {
        self.paint(RED, &format!("error: {message}"))
    }

    fn render_command(&self, text: &str) -> String {
        let Some(segments) = self.classifier.segment(text) else {
            return text.to_string();
        };

        let mut rendered = format!(
            "{}{}",
            self.paint(GREEN, segments.prompt),
            self.paint(BOLD, segments.command)
        );
        if !segments.rest.is_empty() {
            rendered.push(' ');
            rendered.push_str(segments.rest);
        }
        rendered
    }

    fn render_output(&self, text: &str) -> String {
        text.split('\n')
            .map(|row| match parse_listing_line(row) {
                Some(ListingLine::Entry { permissions, rest }) => {
                    format!("{}{}", self.paint(BLUE, permissions), rest)
                }
                Some(ListingLine::Total { .. }) => self.paint(DIM, row),
                None => row.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color && !text.is_empty() {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// One-line summary for `:status`.
pub fn status_line(session: &Session) -> String {
    let mut parts = vec![format!("state: {}", session.state())];
    if let Some(descriptor) = session.descriptor() {
        parts.push(format!("target: {}", descriptor.target()));
    }
    if let Some(elapsed) = session.elapsed_display() {
        parts.push(format!("elapsed: {elapsed}"));
    }
    parts.push(format!("prompt: {:?}", session.current_prompt()));
    if let Some(err) = session.last_error() {
        parts.push(format!("last error: {err}"));
    }
    parts.join(" | ")
}
