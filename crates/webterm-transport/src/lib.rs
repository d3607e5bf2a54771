//! # webterm-transport
//!
//! Channel to the shell bridge for the webterm client.
//!
//! This crate provides:
//! - The [`Transport`] seam the session state machine drives
//! - A WebSocket implementation with readiness probe and capped channel open
//! - Classification of bridge error messages
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on webterm-core and
//! reports everything it observes as [`TransportEvent`]s on an unbounded
//! channel, so callers never block on the network.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod websocket;

pub use classify::classify_server_error;
pub use websocket::WebSocketTransport;

use webterm_core::{ConnectRequest, Result};

#[doc(no_inline)]
pub use webterm_core::TransportEvent;

/// Outbound side of the channel to the shell bridge.
///
/// Calls return as soon as the request is queued. Outcomes arrive later as
/// [`TransportEvent`]s.
pub trait Transport: Send {
    /// Open the channel if needed and request a shell for `request`.
    fn connect(&mut self, request: ConnectRequest) -> Result<()>;

    /// Run one command line on the remote shell.
    fn send_command(&mut self, command: &str) -> Result<()>;

    /// Send Ctrl-C to the remote shell.
    fn send_interrupt(&mut self) -> Result<()>;

    /// Close the shell and the channel. Calling it with no open channel is a no-op.
    fn disconnect(&mut self);
}
