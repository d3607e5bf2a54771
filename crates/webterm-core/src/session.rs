//! Session identity and lifecycle states.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a remote shell session.
///
/// ```text
/// Idle ─► Connecting ─► Connected ─► Closing ─► Closed
///              │             │
///              └──► Failed ◄─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No connection has been attempted yet
    Idle,
    /// Waiting for the bridge to establish the shell
    Connecting,
    /// Shell is live
    Connected,
    /// Tear-down in progress
    Closing,
    /// Session ended normally
    Closed,
    /// Session ended with an error
    Failed,
}

impl SessionState {
    /// Whether `connect` may be called from this state.
    pub fn can_connect(self) -> bool {
        matches!(self, Self::Idle | Self::Closed | Self::Failed)
    }

    /// Whether the transport channel may still be live.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
