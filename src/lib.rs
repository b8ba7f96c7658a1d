//! # logfanout
//!
//! A fanout logger that writes every record to an ordered set of sinks.
//!
//! ## Features
//!
//! - **Network sink**: token-framed TCP delivery to Logentries-style
//!   collectors with lazy dialling and stale-connection redial
//! - **Hierarchy**: child loggers tag their records and forward to a parent
//! - **Two write paths**: synchronous [`Logger::write`] and queued
//!   [`Logger::print`] backed by one worker thread per logger tree
//! - **Local output**: standard output or any [`std::io::Write`]
//! - **Access lines**: client address resolution and coloured HTTP badges

pub mod access;
#[cfg(feature = "console")]
pub mod colors;
pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::prefix;
    pub use crate::core::{
        ConfigField, ErrorReporting, ExitHook, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        OverflowCallback, OverflowPolicy, PrefixGenerator, Result, Sink, TimestampFormat,
        DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{NetworkConfig, NetworkSink, StdoutSink, WriterSink};
}

pub use crate::core::{
    prefix, ConfigField, ErrorReporting, ExitHook, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, OverflowCallback, OverflowPolicy, PrefixGenerator, Result, Sink,
    TimestampFormat, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::sinks::{NetworkConfig, NetworkSink, StdoutSink, WriterSink};
