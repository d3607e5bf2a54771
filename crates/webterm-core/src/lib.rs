//! # webterm-core
//!
//! Core types for the webterm remote terminal client.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other webterm crates. It provides:
//!
//! - Connection descriptor parsing (`HOST:USER:SECRET`)
//! - Session types (SessionId, SessionState)
//! - Terminal line records for the transcript log
//! - Wire protocol messages exchanged with the shell bridge
//! - Error types
//! - Configuration
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other webterm crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod line;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use config::{
    ClientConfig, CustomPromptConfig, DetectionSettings, LoggingSettings, SessionSettings,
    TransportSettings,
};
pub use descriptor::{ConnectionDescriptor, Secret, DEFAULT_PORT};
pub use error::{DescriptorError, Error, ProtocolErrorKind, Result, TransportError};
pub use line::{LineKind, TerminalLine};
pub use protocol::{ClientMessage, ConnectRequest, ServerMessage, TransportEvent};
pub use session::{SessionId, SessionState};
