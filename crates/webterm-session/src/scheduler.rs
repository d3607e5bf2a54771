//! Cancellable timers delivered as session events.
//!
//! The state machine never sleeps. It asks a [`Scheduler`] to deliver a
//! [`Timer`] later and keeps the returned [`TimerHandle`]; dropping or
//! cancelling the handle guarantees the timer never fires.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::event::SessionEvent;

/// Timers the session schedules. Each carries the connection attempt it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Give up waiting for `connected`
    ConnectTimeout {
        /// Attempt number
        attempt: u64,
    },
    /// Send the single tagged retry
    RetryConnect {
        /// Attempt number
        attempt: u64,
    },
    /// Refresh the elapsed-time display
    Tick {
        /// Attempt number
        attempt: u64,
    },
}

impl Timer {
    /// Attempt this timer was scheduled for.
    pub fn attempt(&self) -> u64 {
        match *self {
            Self::ConnectTimeout { attempt }
            | Self::RetryConnect { attempt }
            | Self::Tick { attempt } => attempt,
        }
    }
}

/// Owner of a scheduled timer. Cancels it on [`cancel`](Self::cancel) or drop.
pub struct TimerHandle {
    timer: Timer,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wrap a timer with the action that cancels it.
    pub fn new(timer: Timer, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            timer,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// The scheduled timer.
    pub fn timer(&self) -> Timer {
        self.timer
    }

    /// Cancel the timer. It will not fire afterwards.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            debug!("Cancelling timer {:?}", self.timer);
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("timer", &self.timer)
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Source of delayed and periodic [`Timer`] events.
pub trait Scheduler: Send {
    /// Deliver `timer` once after `delay`.
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerHandle;

    /// Deliver `timer` every `period`, first after one period.
    fn schedule_repeating(&mut self, period: Duration, timer: Timer) -> TimerHandle;
}

/// [`Scheduler`] backed by tokio tasks that post into the session event channel.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl TokioScheduler {
    /// Create a scheduler spawning on `runtime` and posting to `events`.
    pub fn new(runtime: Handle, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { runtime, events }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::Timer(timer));
        });
        TimerHandle::new(timer, move || task.abort())
    }

    fn schedule_repeating(&mut self, period: Duration, timer: Timer) -> TimerHandle {
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(SessionEvent::Timer(timer)).is_err() {
                    break;
                }
            }
        });
        TimerHandle::new(timer, move || task.abort())
    }
}
