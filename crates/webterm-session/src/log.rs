//! Append-only transcript of a session.

use webterm_core::TerminalLine;

/// Lines shown to the user, in arrival order.
///
/// Lines are only ever appended, or the whole log is replaced. Readers can
/// poll for lines added since their last read.
#[derive(Debug, Default)]
pub struct TerminalLog {
    lines: Vec<TerminalLine>,
    /// Position of last read
    last_read_pos: usize,
}

impl TerminalLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn append(&mut self, line: TerminalLine) {
        self.lines.push(line);
    }

    /// All lines.
    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    /// Most recent line.
    pub fn last(&self) -> Option<&TerminalLine> {
        self.lines.last()
    }

    /// Lines appended since the previous call.
    pub fn read_since_last(&mut self) -> &[TerminalLine] {
        let start = self.last_read_pos.min(self.lines.len());
        self.last_read_pos = self.lines.len();
        &self.lines[start..]
    }

    /// Number of lines not yet read.
    pub fn unread_count(&self) -> usize {
        self.lines.len().saturating_sub(self.last_read_pos)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replace every line with `line`.
    pub fn clear_with(&mut self, line: TerminalLine) {
        self.lines.clear();
        self.lines.push(line);
        self.last_read_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webterm_core::LineKind;

    #[test]
    fn test_log_append_order() {
        let mut log = TerminalLog::new();
        log.append(TerminalLine::output("first"));
        log.append(TerminalLine::output("second"));

        let texts: Vec<_> = log.lines().iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn test_log_read_since_last() {
        let mut log = TerminalLog::new();
        log.append(TerminalLine::output("a"));
        assert_eq!(log.read_since_last().len(), 1);
        assert_eq!(log.unread_count(), 0);

        log.append(TerminalLine::output("b"));
        let unread = log.read_since_last();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].text(), "b");
        assert!(log.read_since_last().is_empty());
    }

    #[test]
    fn test_log_clear_with() {
        let mut log = TerminalLog::new();
        log.append(TerminalLine::output("a"));
        log.append(TerminalLine::output("b"));
        log.read_since_last();

        log.clear_with(TerminalLine::system("cleared"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().kind(), LineKind::System);
        assert_eq!(log.unread_count(), 1);
    }
}
