//! Error types for the webterm client.

use thiserror::Error;

use crate::SessionState;

/// Reasons a connection string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The string did not split into exactly `HOST:USERNAME:PASSWORD`
    #[error("expected HOST:USERNAME:PASSWORD, found {0} segment(s)")]
    SegmentCount(usize),
}

/// Classification of `ssh-error` messages reported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolErrorKind {
    /// The bridge lost the host and fell back to loopback; one retry is allowed
    HostFallback,
    /// Any other remote failure (auth, network, shell)
    Remote,
}

/// Failures surfaced by the transport layer, already classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying channel could not be opened or broke
    #[error("Channel error: {0}")]
    Channel(String),

    /// The bridge reported an `ssh-error`
    #[error("Remote error: {message}")]
    Protocol {
        /// Error subtype
        kind: ProtocolErrorKind,
        /// Message as sent by the bridge
        message: String,
    },
}

impl TransportError {
    /// Build a protocol error of the given kind.
    pub fn protocol(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self::Protocol {
            kind,
            message: message.into(),
        }
    }

    /// Whether this failure qualifies for the single automatic retry.
    pub fn is_host_fallback(&self) -> bool {
        matches!(
            self,
            Self::Protocol {
                kind: ProtocolErrorKind::HostFallback,
                ..
            }
        )
    }

    /// Subtype of a protocol error, `None` for channel failures.
    pub fn kind(&self) -> Option<ProtocolErrorKind> {
        match self {
            Self::Channel(_) => None,
            Self::Protocol { kind, .. } => Some(*kind),
        }
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Channel(message) => message,
            Self::Protocol { message, .. } => message,
        }
    }
}

/// Main error type for webterm operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed connection string
    #[error("Invalid connection string: {0}")]
    Descriptor(#[from] DescriptorError),

    /// No `ssh-connected` within the connect timeout
    #[error("Connection timed out after {0}s")]
    ConnectTimeout(u64),

    /// Channel or protocol failure reported by the transport
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Operation not permitted in the current session state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the session was in
        state: SessionState,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_error() {
        let err: Error = DescriptorError::SegmentCount(2).into();
        assert_eq!(
            err.to_string(),
            "Invalid connection string: expected HOST:USERNAME:PASSWORD, found 2 segment(s)"
        );
    }

    #[test]
    fn test_timeout_error() {
        let err = Error::ConnectTimeout(15);
        assert_eq!(err.to_string(), "Connection timed out after 15s");
    }

    #[test]
    fn test_channel_error_is_transparent() {
        let err: Error = TransportError::Channel("refused".to_string()).into();
        assert_eq!(err.to_string(), "Channel error: refused");
    }

    #[test]
    fn test_protocol_error_message() {
        let err = TransportError::protocol(ProtocolErrorKind::Remote, "auth failed");
        assert_eq!(err.to_string(), "Remote error: auth failed");
        assert_eq!(err.message(), "auth failed");
        assert!(!err.is_host_fallback());
    }

    #[test]
    fn test_host_fallback_detection() {
        let err = TransportError::protocol(ProtocolErrorKind::HostFallback, "connect 127.0.0.1");
        assert!(err.is_host_fallback());
        assert!(!TransportError::Channel("x".into()).is_host_fallback());
    }

    #[test]
    fn test_invalid_state_error() {
        let err = Error::InvalidState {
            operation: "connect",
            state: SessionState::Connected,
        };
        assert_eq!(
            err.to_string(),
            "Cannot connect while session is connected"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
