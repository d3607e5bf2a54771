//! # webterm-session
//!
//! Session lifecycle management for the webterm client.
//!
//! This crate provides:
//! - The session state machine and its transition rules
//! - Command history and the input line
//! - The append-only transcript
//! - Cancellable timers and the connection clock
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on webterm-core,
//! webterm-transport and webterm-detector. The session owns no I/O: it
//! drives an injected [`Transport`](webterm_transport::Transport) and
//! [`Scheduler`] and is advanced by [`SessionEvent`]s.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod history;
pub mod input;
pub mod log;
pub mod scheduler;
pub mod session;
pub mod testing;
pub mod timer;

// Re-export commonly used types
pub use event::SessionEvent;
pub use history::CommandHistory;
pub use input::InputController;
pub use log::TerminalLog;
pub use scheduler::{Scheduler, Timer, TimerHandle, TokioScheduler};
pub use session::Session;
pub use timer::{format_elapsed, SessionTimer};
