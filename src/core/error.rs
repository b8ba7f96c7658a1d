//! Error types for the logger system

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Required network sink setting that was left unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Token,
    Host,
    Port,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigField::Token => write!(f, "token"),
            ConfigField::Host => write!(f, "host"),
            ConfigField::Port => write!(f, "port"),
        }
    }
}

/// One failing sink inside a broadcast
#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the sink in registration order
    pub index: usize,
    /// Name reported by the sink
    pub sink: String,
    pub error: LoggerError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink #{} ({}): {}", self.index, self.sink, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A required setting of the network sink is missing
    #[error("Logger {0} is not defined")]
    MissingSetting(ConfigField),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// `open` found a connection handle already in place
    #[error("Logger already connected")]
    AlreadyConnected,

    /// Operation needs a connection but the sink holds none
    #[error("Logger not connected")]
    NotConnected,

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Async queue full with buffer details
    #[error("Log queue full: {current}/{max} records buffered")]
    QueueFull { current: usize, max: usize },

    /// Async worker is gone
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Registering the sink would make a logger forward to itself
    #[error("Sink registration would create a forwarding cycle")]
    HierarchyCycle,

    /// Every failing sink of a broadcast
    #[error("{} of the sinks failed: {}", .failures.len(), join_failures(.failures))]
    Broadcast { failures: Vec<SinkFailure> },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a queue full error with buffer details
    pub fn queue_full(current: usize, max: usize) -> Self {
        LoggerError::QueueFull { current, max }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors caused by configuration rather than the transport
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::MissingSetting(_) | LoggerError::InvalidConfiguration { .. }
        )
    }
}
