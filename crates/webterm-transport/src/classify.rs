//! Classification of `ssh-error` messages.
//!
//! Bridges deployed behind a proxy sometimes lose the requested host and fall
//! back to the loopback address, or reject the first request outright because
//! the host field did not survive the hop. Those failures are worth exactly
//! one retry; everything else is reported as-is.

use lazy_static::lazy_static;
use regex::Regex;

use webterm_core::{ProtocolErrorKind, TransportError};

lazy_static! {
    static ref HOST_FALLBACK: Regex = Regex::new(
        r"(?ix)
        127\.0\.0\.1
        | \blocalhost\b
        | (?:^|[\s\[])::1\b
        | \bmissing\s+host\b
        | \bno\s+host\b
        | \bhost\s+(?:is\s+)?(?:missing|required|empty|not\s+(?:provided|specified|set))\b
        "
    )
    .unwrap();
}

/// Whether `message` describes a lost or loopback host.
pub fn is_host_fallback(message: &str) -> bool {
    HOST_FALLBACK.is_match(message)
}

/// Turn a bridge error message into a typed transport error.
///
/// ```
/// use webterm_core::ProtocolErrorKind;
/// use webterm_transport::classify_server_error;
///
/// let err = classify_server_error("connect ECONNREFUSED 127.0.0.1:22");
/// assert_eq!(err.kind(), Some(ProtocolErrorKind::HostFallback));
/// ```
pub fn classify_server_error(message: &str) -> TransportError {
    let kind = if is_host_fallback(message) {
        ProtocolErrorKind::HostFallback
    } else {
        ProtocolErrorKind::Remote
    };
    TransportError::protocol(kind, message)
}
