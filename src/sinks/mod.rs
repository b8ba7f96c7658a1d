//! Sink implementations

pub mod local;
pub mod network;

pub use local::{StdoutSink, WriterSink};
pub use network::{NetworkConfig, NetworkSink};

pub use crate::core::Sink;
