//! Elapsed connection time.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scheduler::TimerHandle;

/// Format a duration as `HH:MM:SS`. Hours keep counting past 24.
///
/// ```
/// use std::time::Duration;
/// use webterm_session::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
/// assert_eq!(format_elapsed(Duration::from_secs(90_000)), "25:00:00");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Running clock of a connected session.
///
/// Owns the repeating tick; stopping the timer cancels it.
#[derive(Debug)]
pub struct SessionTimer {
    started_at: DateTime<Utc>,
    display: String,
    tick: TimerHandle,
}

impl SessionTimer {
    /// Start counting from `started_at`, refreshed by `tick`.
    pub fn start(started_at: DateTime<Utc>, tick: TimerHandle) -> Self {
        Self {
            started_at,
            display: format_elapsed(Duration::ZERO),
            tick,
        }
    }

    /// When the session connected.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Elapsed time at `now`, zero if `now` precedes the start.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Recompute the display for `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> &str {
        self.display = format_elapsed(self.elapsed_at(now));
        &self.display
    }

    /// Display as of the last refresh.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Stop ticking.
    pub fn stop(self) {
        self.tick.cancel();
    }
}
