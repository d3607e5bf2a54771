//! Inputs to the session state machine.

use webterm_core::TransportEvent;

use crate::scheduler::Timer;

/// Everything that can advance a [`Session`](crate::Session) besides user operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Reported by the transport
    Transport(TransportEvent),
    /// Delivered by the scheduler
    Timer(Timer),
}

impl From<TransportEvent> for SessionEvent {
    fn from(event: TransportEvent) -> Self {
        Self::Transport(event)
    }
}

impl From<Timer> for SessionEvent {
    fn from(timer: Timer) -> Self {
        Self::Timer(timer)
    }
}
