//! Test doubles for driving a [`Session`](crate::Session) without I/O.
//!
//! [`RecordingTransport`] captures every call the state machine makes and
//! [`ManualScheduler`] records timers instead of running them. Both are cheap
//! clones sharing their state, so a test keeps one copy while the session
//! owns the other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use webterm_core::{ConnectRequest, Result, TransportError};
use webterm_transport::Transport;

use crate::scheduler::{Scheduler, Timer, TimerHandle};

/// One call made on a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `connect`
    Connect(ConnectRequest),
    /// `send_command`
    Command(String),
    /// `send_interrupt`
    Interrupt,
    /// `disconnect`
    Disconnect,
}

/// [`Transport`] that records calls and never touches the network.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    fail_next: Arc<Mutex<Option<TransportError>>>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests passed to `connect`, in order.
    pub fn connect_requests(&self) -> Vec<ConnectRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Connect(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make the next fallible call return `err`.
    pub fn fail_next(&self, err: TransportError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn record(&self, call: TransportCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl Transport for RecordingTransport {
    fn connect(&mut self, request: ConnectRequest) -> Result<()> {
        self.record(TransportCall::Connect(request))
    }

    fn send_command(&mut self, command: &str) -> Result<()> {
        self.record(TransportCall::Command(command.to_string()))
    }

    fn send_interrupt(&mut self) -> Result<()> {
        self.record(TransportCall::Interrupt)
    }

    fn disconnect(&mut self) {
        self.calls.lock().unwrap().push(TransportCall::Disconnect);
    }
}

/// A timer recorded by [`ManualScheduler`].
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    /// The timer
    pub timer: Timer,
    /// Requested delay or period
    pub delay: Duration,
    /// Whether it was scheduled as repeating
    pub repeating: bool,
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTimer {
    /// Whether the owning handle was cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// [`Scheduler`] that only records. Tests fire timers by feeding them to the session.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    scheduled: Arc<Mutex<Vec<ScheduledTimer>>>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every timer ever scheduled, in order.
    pub fn scheduled(&self) -> Vec<ScheduledTimer> {
        self.scheduled.lock().unwrap().clone()
    }

    /// Timers that are still armed.
    pub fn pending(&self) -> Vec<ScheduledTimer> {
        self.scheduled()
            .into_iter()
            .filter(|scheduled| !scheduled.is_cancelled())
            .collect()
    }

    /// Whether `timer` is still armed.
    pub fn is_pending(&self, timer: Timer) -> bool {
        self.pending().iter().any(|scheduled| scheduled.timer == timer)
    }

    fn record(&self, delay: Duration, timer: Timer, repeating: bool) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.scheduled.lock().unwrap().push(ScheduledTimer {
            timer,
            delay,
            repeating,
            cancelled: Arc::clone(&cancelled),
        });
        TimerHandle::new(timer, move || cancelled.store(true, Ordering::SeqCst))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.record(delay, timer, false)
    }

    fn schedule_repeating(&mut self, period: Duration, timer: Timer) -> TimerHandle {
        self.record(period, timer, true)
    }
}
