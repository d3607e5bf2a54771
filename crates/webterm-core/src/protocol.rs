//! Wire protocol spoken with the shell bridge.
//!
//! Every frame is a JSON text message shaped `{"event": <name>, "data": <payload>}`.
//! This is plain WebSocket framing, not Socket.IO: the bridge must accept
//! these frames directly and answer a readiness probe with its own
//! `socket-check-ack` frame echoing the probe `id`, since there are no
//! acknowledgement callbacks.
//!
//! | Direction | Event | Payload |
//! |---|---|---|
//! | client→server | `socket-check` | `{id, timestamp}` |
//! | client→server | `ssh-connect` | `{host, port, username, password, retry?}` |
//! | client→server | `ssh-command` | `{command}` |
//! | client→server | `ssh-interrupt` | `{}` |
//! | client→server | `ssh-disconnect` | `{}` |
//! | server→client | `socket-check-ack` | `{id, ready}` |
//! | server→client | `ssh-connected` | `{}` |
//! | server→client | `ssh-error` | `{message}` |
//! | server→client | `ssh-data` | `{data}` |
//! | server→client | `ssh-closed` | `{message}` |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConnectionDescriptor, Result, TransportError};

/// Payload of `ssh-connect`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Remote host
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Set on the single automatic retry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
}

impl ConnectRequest {
    /// Build the request for a descriptor.
    pub fn from_descriptor(descriptor: &ConnectionDescriptor, retry: bool) -> Self {
        Self {
            host: descriptor.host.clone(),
            port: descriptor.port,
            username: descriptor.username.clone(),
            password: descriptor.secret.expose().to_string(),
            retry: retry.then_some(true),
        }
    }

    /// Whether this request is the tagged retry.
    pub fn is_retry(&self) -> bool {
        self.retry == Some(true)
    }
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("retry", &self.retry)
            .finish()
    }
}

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Readiness probe, answered by `socket-check-ack` with the same id
    SocketCheck {
        /// Correlates the acknowledgement
        id: u64,
        /// Client time in milliseconds since the epoch
        timestamp: i64,
    },
    /// Ask the bridge to open the SSH shell
    SshConnect(ConnectRequest),
    /// Run one command line
    SshCommand {
        /// Command text, without trailing newline
        command: String,
    },
    /// Send Ctrl-C to the shell
    SshInterrupt {},
    /// Close the SSH shell
    SshDisconnect {},
}

impl ClientMessage {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SocketCheck { .. } => "socket-check",
            Self::SshConnect(_) => "ssh-connect",
            Self::SshCommand { .. } => "ssh-command",
            Self::SshInterrupt {} => "ssh-interrupt",
            Self::SshDisconnect {} => "ssh-disconnect",
        }
    }

    /// Serialize to a text frame.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames received from the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Answer to a readiness probe
    SocketCheckAck {
        /// Probe id being acknowledged
        id: u64,
        /// Whether the bridge is ready for `ssh-connect`
        ready: bool,
    },
    /// Shell established
    SshConnected,
    /// Connect or runtime failure
    SshError {
        /// Human-readable reason
        message: String,
    },
    /// Raw output chunk
    SshData {
        /// Output text, possibly with escape sequences
        data: String,
    },
    /// Shell terminated
    SshClosed {
        /// Reason given by the bridge
        message: String,
    },
}

impl ServerMessage {
    /// Parse a text frame.
    ///
    /// Returns `Ok(None)` for well-formed frames carrying an event this client
    /// does not handle. Missing payload fields default to empty values, the
    /// bridge omits `data` on bare notifications.
    pub fn from_frame(text: &str) -> Result<Option<Self>> {
        let frame: Value = serde_json::from_str(text)?;
        let data = &frame["data"];
        let str_field = |name: &str| data[name].as_str().unwrap_or_default().to_string();

        let message = match frame["event"].as_str().unwrap_or_default() {
            "socket-check-ack" => Self::SocketCheckAck {
                id: data["id"].as_u64().unwrap_or(0),
                ready: data["ready"].as_bool().unwrap_or(true),
            },
            "ssh-connected" => Self::SshConnected,
            "ssh-error" => Self::SshError {
                message: str_field("message"),
            },
            "ssh-data" => Self::SshData {
                data: match data {
                    Value::String(s) => s.clone(),
                    _ => str_field("data"),
                },
            },
            "ssh-closed" => Self::SshClosed {
                message: str_field("message"),
            },
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

/// Channel-level events delivered to the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Remote shell established
    Connected,
    /// Classified failure
    Error(TransportError),
    /// Output chunk in arrival order
    Data(String),
    /// Remote shell ended
    Closed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connect_request_shape() {
        let desc = ConnectionDescriptor::parse("h:u:p").unwrap();
        let frame = ClientMessage::SshConnect(ConnectRequest::from_descriptor(&desc, false));
        let value: Value = serde_json::from_str(&frame.to_frame().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "ssh-connect",
                "data": {"host": "h", "port": 22, "username": "u", "password": "p"}
            })
        );
    }

    #[test]
    fn test_retry_flag_serialized_only_on_retry() {
        let desc = ConnectionDescriptor::parse("h:u:p").unwrap();
        let request = ConnectRequest::from_descriptor(&desc, true);
        assert!(request.is_retry());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["retry"], json!(true));
    }

    #[test]
    fn test_empty_payload_events() {
        let value: Value =
            serde_json::from_str(&ClientMessage::SshInterrupt {}.to_frame().unwrap()).unwrap();
        assert_eq!(value, json!({"event": "ssh-interrupt", "data": {}}));
        assert_eq!(ClientMessage::SshDisconnect {}.event_name(), "ssh-disconnect");
    }

    #[test]
    fn test_command_frame() {
        let msg = ClientMessage::SshCommand {
            command: "ls -la".to_string(),
        };
        let value: Value = serde_json::from_str(&msg.to_frame().unwrap()).unwrap();
        assert_eq!(value["event"], "ssh-command");
        assert_eq!(value["data"]["command"], "ls -la");
    }

    #[test]
    fn test_parse_server_frames() {
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"ssh-connected"}"#).unwrap(),
            Some(ServerMessage::SshConnected)
        );
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"ssh-data","data":{"data":"hi\n"}}"#).unwrap(),
            Some(ServerMessage::SshData {
                data: "hi\n".to_string()
            })
        );
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"ssh-error","data":{"message":"denied"}}"#)
                .unwrap(),
            Some(ServerMessage::SshError {
                message: "denied".to_string()
            })
        );
    }

    #[test]
    fn test_ack_defaults_to_ready() {
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"socket-check-ack","data":{"id":7}}"#).unwrap(),
            Some(ServerMessage::SocketCheckAck { id: 7, ready: true })
        );
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"pong"}"#).unwrap(),
            None
        );
        assert!(ServerMessage::from_frame("not json").is_err());
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let desc = ConnectionDescriptor::parse("h:u:hunter2").unwrap();
        let request = ConnectRequest::from_descriptor(&desc, false);
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
