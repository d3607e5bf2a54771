//! Connection descriptor parsing.
//!
//! A descriptor is entered as one compact string, `HOST:USERNAME:PASSWORD`.
//! The port is not part of the string; it defaults to [`DEFAULT_PORT`].

use std::str::FromStr;

use crate::DescriptorError;

/// Port used when the connection string does not carry one.
pub const DEFAULT_PORT: u16 = 22;

/// A password or other credential that must not leak into logs.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Parsed target of a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Remote host name or address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub secret: Secret,
}

impl ConnectionDescriptor {
    /// Parse `HOST:USERNAME:PASSWORD` using the default port.
    ///
    /// # Example
    /// ```
    /// use webterm_core::ConnectionDescriptor;
    ///
    /// let desc = ConnectionDescriptor::parse("10.0.0.5:root:hunter2").unwrap();
    /// assert_eq!(desc.host, "10.0.0.5");
    /// assert_eq!(desc.username, "root");
    /// assert_eq!(desc.port, 22);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        Self::parse_with_port(raw, DEFAULT_PORT)
    }

    /// Parse `HOST:USERNAME:PASSWORD`, assigning `port`.
    ///
    /// Exactly three segments are required, so a password containing `:`
    /// is rejected rather than silently truncated. Segments are taken
    /// verbatim, empty ones included.
    pub fn parse_with_port(raw: &str, port: u16) -> Result<Self, DescriptorError> {
        let segments: Vec<&str> = raw.split(':').collect();
        let [host, username, secret] = segments.as_slice() else {
            return Err(DescriptorError::SegmentCount(segments.len()));
        };

        Ok(Self {
            host: (*host).to_string(),
            port,
            username: (*username).to_string(),
            secret: Secret::new(*secret),
        })
    }

    /// `user@host:port`, safe for logs and status lines.
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    /// Drop the credential, keeping the addressing fields.
    pub fn forget_secret(&mut self) {
        self.secret = Secret::default();
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
