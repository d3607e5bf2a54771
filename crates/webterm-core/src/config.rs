//! Configuration types for the webterm client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, DEFAULT_PORT};

/// Client configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Channel settings
    pub transport: TransportSettings,
    /// Session state machine settings
    pub session: SessionSettings,
    /// Prompt detection settings
    pub detection: DetectionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl ClientConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ClientConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        self.transport.validate()?;
        self.session.validate()?;

        for pattern in &self.detection.custom_prompts {
            pattern.validate()?;
        }

        Ok(())
    }
}

/// Channel settings for the bridge connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Bridge endpoint (`ws://` or `wss://`)
    pub endpoint: String,
    /// How long to wait for the readiness probe acknowledgement
    pub probe_timeout_ms: u64,
    /// Delay before `ssh-connect` when the probe is not acknowledged
    pub warmup_delay_ms: u64,
    /// Maximum channel open attempts
    pub max_open_attempts: u32,
    /// Overall budget for opening the channel
    pub open_timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:5000/terminal".to_string(),
            probe_timeout_ms: 2000,
            warmup_delay_ms: 1000,
            max_open_attempts: 3,
            open_timeout_ms: 10_000,
        }
    }
}

impl TransportSettings {
    /// Probe acknowledgement window.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Fallback delay when the probe goes unanswered.
    pub fn warmup_delay(&self) -> Duration {
        Duration::from_millis(self.warmup_delay_ms)
    }

    /// Overall channel open budget.
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    fn validate(&self) -> crate::Result<()> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "transport.endpoint must be a ws:// or wss:// URL, got '{}'",
                self.endpoint
            )));
        }
        if self.max_open_attempts == 0 {
            return Err(Error::Config(
                "transport.max_open_attempts must be > 0".to_string(),
            ));
        }
        if self.open_timeout_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(Error::Config(
                "transport timeouts must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session state machine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds to wait for `ssh-connected`
    pub connect_timeout_secs: u64,
    /// Delay before the single automatic retry
    pub retry_delay_ms: u64,
    /// Duration display refresh period
    pub tick_interval_ms: u64,
    /// Prompt shown before the remote shell has sent one
    pub default_prompt: String,
    /// Port assigned to parsed descriptors
    pub default_port: u16,
    /// Maximum history entries kept (0 = unbounded)
    pub history_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            retry_delay_ms: 1000,
            tick_interval_ms: 1000,
            default_prompt: "$ ".to_string(),
            default_port: DEFAULT_PORT,
            history_limit: 0,
        }
    }
}

impl SessionSettings {
    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Retry delay as a duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Tick period as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "session.connect_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config(
                "session.tick_interval_ms must be > 0".to_string(),
            ));
        }
        if self.default_port == 0 {
            return Err(Error::Config("session.default_port must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Prompt detection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectionSettings {
    /// Additional prompt conventions
    pub custom_prompts: Vec<CustomPromptConfig>,
}

/// User-defined prompt convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPromptConfig {
    /// Strategy name (identifier)
    pub name: String,
    /// Regular expression; a `prompt` capture group selects the prompt text,
    /// otherwise the whole match is used
    pub pattern: String,
    /// Evaluation priority (built-ins use 100, 90 and 10)
    #[serde(default = "default_custom_priority")]
    pub priority: u32,
}

fn default_custom_priority() -> u32 {
    50
}

impl CustomPromptConfig {
    /// Validate the pattern configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(
                "custom prompt name cannot be empty".to_string(),
            ));
        }

        regex::Regex::new(&self.pattern).map_err(|e| {
            Error::Config(format!(
                "Invalid regex pattern '{}': {}",
                self.name, e
            ))
        })?;

        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.session.connect_timeout_secs, 15);
        assert_eq!(config.session.retry_delay_ms, 1000);
        assert_eq!(config.session.default_port, 22);
        assert_eq!(config.transport.warmup_delay_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint_scheme() {
        let mut config = ClientConfig::default();
        config.transport.endpoint = "http://localhost:5000".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_open_attempts() {
        let mut config = ClientConfig::default();
        config.transport.max_open_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_connect_timeout() {
        let mut config = ClientConfig::default();
        config.session.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
transport:
  endpoint: "wss://bridge.example.com/terminal"
  probe_timeout_ms: 500
  max_open_attempts: 5

session:
  connect_timeout_secs: 30
  default_prompt: "> "

logging:
  level: debug
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.transport.endpoint, "wss://bridge.example.com/terminal");
        assert_eq!(config.transport.probe_timeout_ms, 500);
        assert_eq!(config.transport.max_open_attempts, 5);
        // Unset fields keep their defaults
        assert_eq!(config.transport.warmup_delay_ms, 1000);
        assert_eq!(config.session.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.session.default_prompt, "> ");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_custom_prompts() {
        let yaml = r#"
detection:
  custom_prompts:
    - name: "fish"
      pattern: "(?P<prompt>\\w+@\\w+ [^>]*>)"
      priority: 70
    - name: "zsh_percent"
      pattern: "\\w+% $"
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.detection.custom_prompts.len(), 2);
        assert_eq!(config.detection.custom_prompts[0].priority, 70);
        assert_eq!(config.detection.custom_prompts[1].priority, 50);
    }

    #[test]
    fn test_invalid_regex_pattern() {
        let yaml = r#"
detection:
  custom_prompts:
    - name: "bad_pattern"
      pattern: "([unclosed"
"#;

        assert!(ClientConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_pattern_name() {
        let pattern = CustomPromptConfig {
            name: " ".to_string(),
            pattern: "test".to_string(),
            priority: 50,
        };
        assert!(pattern.validate().is_err());
    }
}
