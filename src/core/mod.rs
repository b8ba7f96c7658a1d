//! Core logger types and traits

pub mod dispatcher;
pub mod error;
pub mod framer;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod prefix;
pub mod sink;
pub mod timestamp;

pub use dispatcher::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{ConfigField, LoggerError, Result, SinkFailure};
pub use framer::{frame, LINE_SEPARATOR};
pub use logger::{ErrorReporting, ExitHook, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use prefix::PrefixGenerator;
pub use sink::{LoggerId, Sink};
pub use timestamp::TimestampFormat;
