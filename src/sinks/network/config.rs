//! Settings for the network sink

use crate::core::{ConfigField, LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dial timeout used unless configured otherwise
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Connection settings for a token-based line collector
///
/// Token, host and a nonzero port are required. Everything else has a default.
///
/// # Example
///
/// ```
/// use logfanout::sinks::NetworkConfig;
///
/// let config = NetworkConfig::from_json(
///     r#"{ "token": "2bfbea1e-10c3", "host": "data.logentries.com", "port": 10000 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.endpoint(), "data.logentries.com:10000");
/// assert_eq!(config.dial_timeout().as_secs(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub token: String,
    pub host: String,
    pub port: u16,
    /// Display tag placed in brackets after the token
    pub prefix: String,
    pub dial_timeout_ms: u64,
    /// Unset means a write blocks as long as the transport does
    pub write_timeout_ms: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            host: String::new(),
            port: 0,
            prefix: String::new(),
            dial_timeout_ms: DEFAULT_DIAL_TIMEOUT.as_millis() as u64,
            write_timeout_ms: None,
        }
    }
}

impl NetworkConfig {
    pub fn new(token: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            token: token.into(),
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Check required settings in the order token, host, port
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(LoggerError::MissingSetting(ConfigField::Token));
        }
        if self.host.is_empty() {
            return Err(LoggerError::MissingSetting(ConfigField::Host));
        }
        if self.port == 0 {
            return Err(LoggerError::MissingSetting(ConfigField::Port));
        }
        if self.dial_timeout_ms == 0 {
            return Err(LoggerError::config(
                "NetworkSink",
                "dial timeout must be at least 1ms",
            ));
        }
        if self.write_timeout_ms == Some(0) {
            return Err(LoggerError::config(
                "NetworkSink",
                "write timeout must be at least 1ms",
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}
