//! Sink trait for log output destinations

use super::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one broadcaster node, used to reject forwarding cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoggerId(u64);

impl LoggerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        LoggerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A destination that accepts already rendered records
///
/// Sinks are shared between loggers through `Arc`, so every method takes
/// `&self` and implementations synchronise internally.
pub trait Sink: Send + Sync {
    /// Write one record, returning the number of bytes the destination took
    fn write(&self, record: &[u8]) -> Result<usize>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;

    /// Id of the logger behind this sink, `None` for leaf destinations
    fn logger_id(&self) -> Option<LoggerId> {
        None
    }

    /// True if writes to this sink eventually reach the logger `id`
    ///
    /// Only broadcasters forward; leaf sinks keep the default.
    fn forwards_to(&self, _id: LoggerId) -> bool {
        false
    }
}
