//! Fanout logger
//!
//! A [`Logger`] owns an ordered list of sinks and writes every record to each
//! of them in registration order. Loggers are sinks themselves, which is how
//! child loggers forward to their parent.

use super::{
    dispatcher::{Dispatcher, DEFAULT_QUEUE_CAPACITY},
    error::{LoggerError, Result, SinkFailure},
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    prefix::{self, PrefixGenerator},
    sink::{LoggerId, Sink},
    timestamp::TimestampFormat,
};
use crate::sinks::{NetworkSink, StdoutSink};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Called by [`Logger::fatalln`] after its write; receives the exit code
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Held while checking for and registering a sink, so two concurrent
/// registrations cannot close a cycle between them.
static REGISTRATION: Mutex<()> = parking_lot::const_mutex(());

/// What a synchronous broadcast reports when sinks fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorReporting {
    /// Return the result of the last sink attempted. Failures of earlier
    /// sinks are counted in the metrics but not returned.
    #[default]
    LastSink,

    /// Return [`LoggerError::Broadcast`] naming every failing sink
    AllSinks,
}

struct LoggerNode {
    id: LoggerId,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    prefix: RwLock<PrefixGenerator>,
    tags: Arc<RwLock<Vec<String>>>,
    error_reporting: ErrorReporting,
    dispatcher: Arc<Dispatcher>,
    exit_hook: ExitHook,
    metrics: Arc<LoggerMetrics>,
}

impl LoggerNode {
    fn render(&self, payload: &[u8]) -> Vec<u8> {
        // Release the lock before running caller code.
        let generate = Arc::clone(&*self.prefix.read());
        let prefix = generate();

        if prefix.is_empty() {
            return payload.to_vec();
        }
        let mut record = Vec::with_capacity(prefix.len() + 1 + payload.len());
        record.extend_from_slice(prefix.as_bytes());
        record.push(b' ');
        record.extend_from_slice(payload);
        record
    }

    /// Entry point of a record into the tree; the only place it is counted
    fn broadcast(&self, record: &[u8]) -> Result<usize> {
        let result = self.fan_out(record);
        if result.is_ok() {
            self.metrics.record_written();
        }
        result
    }

    /// Write an already rendered record to every sink in order
    ///
    /// Failures are counted for leaf sinks only. A failing logger sink has
    /// already counted its own.
    fn fan_out(&self, record: &[u8]) -> Result<usize> {
        let sinks: Vec<Arc<dyn Sink>> = self.sinks.read().clone();

        let mut last: Result<usize> = Ok(0);
        let mut failures = Vec::new();

        for (index, sink) in sinks.iter().enumerate() {
            let result = sink.write(record);
            if let Err(ref e) = result {
                if sink.logger_id().is_none() {
                    self.metrics.record_sink_failure();
                }
                log::debug!("logfanout: sink #{} ({}) failed: {}", index, sink.name(), e);
            }

            match self.error_reporting {
                ErrorReporting::LastSink => last = result,
                ErrorReporting::AllSinks => match result {
                    Ok(n) => last = Ok(n),
                    Err(error) => failures.push(SinkFailure {
                        index,
                        sink: sink.name().to_string(),
                        error,
                    }),
                },
            }
        }

        if !failures.is_empty() {
            return Err(LoggerError::Broadcast { failures });
        }
        last
    }

    fn flush(&self) -> Result<()> {
        let sinks: Vec<Arc<dyn Sink>> = self.sinks.read().clone();
        for sink in sinks {
            sink.flush()?;
        }
        Ok(())
    }

    fn forwards_to(&self, id: LoggerId) -> bool {
        self.id == id || self.sinks.read().iter().any(|sink| sink.forwards_to(id))
    }
}

/// Handle to a fanout logger
///
/// Cloning is cheap and every clone refers to the same logger.
///
/// # Example
///
/// ```
/// use logfanout::prelude::*;
///
/// let logger = Logger::builder()
///     .prefix_generator(prefix::empty())
///     .sink(WriterSink::new(Vec::new()))
///     .build();
///
/// logger.write(b"service started\n").unwrap();
///
/// let request = logger.child(["req=42"]);
/// request.write(b"GET /health\n").unwrap();
/// ```
#[derive(Clone)]
pub struct Logger {
    node: Arc<LoggerNode>,
}

impl Logger {
    /// Logger without sinks, timestamp prefix and default async settings
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn id(&self) -> LoggerId {
        self.node.id
    }

    /// Append a sink; it receives every record written after this call
    ///
    /// Fails with [`LoggerError::HierarchyCycle`] if the sink forwards back
    /// to this logger.
    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> Result<()> {
        let _registration = REGISTRATION.lock();
        if sink.forwards_to(self.node.id) {
            return Err(LoggerError::HierarchyCycle);
        }
        self.node.sinks.write().push(sink);
        Ok(())
    }

    /// Register a network sink for a token-based collector
    ///
    /// The connection is dialled lazily by the first write.
    pub fn add_network_sink(
        &self,
        token: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Arc<NetworkSink>> {
        let sink = Arc::new(NetworkSink::connect_to(token, host, port)?);
        self.add_sink(Arc::clone(&sink) as Arc<dyn Sink>)?;
        Ok(sink)
    }

    /// Register the process's standard output
    pub fn add_local_sink(&self) -> Result<()> {
        self.add_sink(Arc::new(StdoutSink::new()))
    }

    pub fn sink_count(&self) -> usize {
        self.node.sinks.read().len()
    }

    pub fn set_prefix_generator(&self, generator: PrefixGenerator) {
        *self.node.prefix.write() = generator;
    }

    pub fn set_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.node.tags.write() = tags.into_iter().map(Into::into).collect();
    }

    pub fn tags(&self) -> Vec<String> {
        self.node.tags.read().clone()
    }

    /// Create a logger whose only sink is this one
    ///
    /// The child renders its current tags as its prefix, so a later
    /// [`set_tags`](Self::set_tags) on the child changes what it emits. It
    /// shares this logger's async queue, exit hook, error reporting and
    /// metrics.
    ///
    /// # Example
    ///
    /// ```
    /// use logfanout::prelude::*;
    ///
    /// let root = Logger::new();
    /// let request = root.child(["req=7", "GET"]);
    ///
    /// assert_eq!(request.tags(), vec!["req=7", "GET"]);
    /// assert_eq!(request.sink_count(), 1);
    /// ```
    #[must_use]
    pub fn child<I, S>(&self, tags: I) -> Logger
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = Arc::new(RwLock::new(
            tags.into_iter().map(Into::into).collect::<Vec<String>>(),
        ));
        let parent: Arc<dyn Sink> = Arc::new(self.clone());
        let render_tags: PrefixGenerator = {
            let tags = Arc::clone(&tags);
            Arc::new(move || tags.read().join(" "))
        };

        Logger {
            node: Arc::new(LoggerNode {
                id: LoggerId::next(),
                sinks: RwLock::new(vec![parent]),
                prefix: RwLock::new(render_tags),
                tags,
                error_reporting: self.node.error_reporting,
                dispatcher: Arc::clone(&self.node.dispatcher),
                exit_hook: Arc::clone(&self.node.exit_hook),
                metrics: Arc::clone(&self.node.metrics),
            }),
        }
    }

    /// Prefix the payload and write it to every sink, waiting for each
    ///
    /// Every sink is attempted even when an earlier one fails. What is
    /// returned depends on the configured [`ErrorReporting`]; with the default
    /// `LastSink` mode only the last sink's outcome is visible. No sinks
    /// yields `Ok(0)`.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        self.node.broadcast(&self.node.render(payload))
    }

    /// Queue a message and return without waiting for any sink
    ///
    /// This logger's prefix is rendered now. Loggers it forwards to, such as
    /// the parent of a child, add their own prefix when the worker delivers
    /// the record.
    ///
    /// Sink errors are never reported back. When the queue is full the
    /// configured [`OverflowPolicy`] applies.
    pub fn print(&self, message: impl Into<String>) {
        let record = self.node.render(message.into().as_bytes());
        let _ = self.node.dispatcher.submit(self.job(record));
    }

    /// Like [`print`](Self::print) with a trailing newline
    pub fn println(&self, message: impl fmt::Display) {
        self.print(format!("{message}\n"));
    }

    /// Like [`print`](Self::print) for preformatted arguments; see the
    /// [`printf!`](crate::printf) macro
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.print(args.to_string());
    }

    /// Queue a message, surfacing backpressure as [`LoggerError::QueueFull`]
    ///
    /// The overflow policy is not consulted.
    pub fn try_print(&self, message: impl Into<String>) -> Result<()> {
        let record = self.node.render(message.into().as_bytes());
        self.node.dispatcher.try_submit(self.job(record))
    }

    pub fn try_printf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.try_print(args.to_string())
    }

    /// Write the message synchronously, then terminate via the exit hook
    ///
    /// Queued async records are not waited for. The exit code is 1.
    pub fn fatalln(&self, message: impl fmt::Display) {
        if let Err(e) = self.write(format!("{message}\n").as_bytes()) {
            log::debug!("logfanout: fatal record not fully delivered: {e}");
        }
        (self.node.exit_hook)(1);
    }

    /// Wait for queued async records, then flush every sink
    ///
    /// Returns `false` if the queue did not drain within `timeout` or a
    /// flush failed.
    pub fn drain(&self, timeout: Duration) -> bool {
        if !self.node.dispatcher.drain(timeout) {
            log::warn!("logfanout: async queue did not drain within {:?}", timeout);
            return false;
        }
        match self.flush() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("logfanout: flush after drain failed: {e}");
                false
            }
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.node.flush()
    }

    /// Counters shared by this logger and every logger in its tree
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.node.metrics
    }

    /// Async records waiting in the queue
    pub fn pending(&self) -> usize {
        self.node.dispatcher.pending()
    }

    pub fn queue_capacity(&self) -> usize {
        self.node.dispatcher.capacity()
    }

    pub fn error_reporting(&self) -> ErrorReporting {
        self.node.error_reporting
    }

    fn job(&self, record: Vec<u8>) -> Box<dyn FnOnce() + Send> {
        let node = Arc::clone(&self.node);
        Box::new(move || {
            if let Err(e) = node.broadcast(&record) {
                node.metrics.record_dropped();
                log::warn!("logfanout: async write failed: {e}");
            }
        })
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("id", &self.node.id)
            .field("sinks", &self.sink_count())
            .field("tags", &*self.node.tags.read())
            .field("error_reporting", &self.node.error_reporting)
            .finish()
    }
}

impl Sink for Logger {
    fn write(&self, record: &[u8]) -> Result<usize> {
        self.node.fan_out(&self.node.render(record))
    }

    fn flush(&self) -> Result<()> {
        self.node.flush()
    }

    fn name(&self) -> &str {
        "logger"
    }

    fn logger_id(&self) -> Option<LoggerId> {
        Some(self.node.id)
    }

    fn forwards_to(&self, id: LoggerId) -> bool {
        self.node.forwards_to(id)
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use logfanout::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .prefix_generator(prefix::timestamp(TimestampFormat::Iso8601))
///     .tags(["api"])
///     .sink(StdoutSink::new())
///     .queue_capacity(4096)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} records dropped", count);
///     }))
///     .error_reporting(ErrorReporting::AllSinks)
///     .build();
/// ```
pub struct LoggerBuilder {
    sinks: Vec<Arc<dyn Sink>>,
    prefix: Option<PrefixGenerator>,
    tags: Vec<String>,
    queue_capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    error_reporting: ErrorReporting,
    exit_hook: Option<ExitHook>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            prefix: None,
            tags: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::AlertAndDrop,
            on_overflow: None,
            error_reporting: ErrorReporting::LastSink,
            exit_hook: None,
        }
    }

    /// Add a sink owned by the logger
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Replace the default timestamp prefix
    #[must_use = "builder methods return a new value"]
    pub fn prefix_generator(mut self, generator: PrefixGenerator) -> Self {
        self.prefix = Some(generator);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Number of async records that may wait for the worker
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_reporting(mut self, mode: ErrorReporting) -> Self {
        self.error_reporting = mode;
        self
    }

    /// Replace `std::process::exit` as the terminator used by `fatalln`
    #[must_use = "builder methods return a new value"]
    pub fn exit_hook(mut self, hook: ExitHook) -> Self {
        self.exit_hook = Some(hook);
        self
    }

    pub fn build(self) -> Logger {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Arc::new(Dispatcher::new(
            self.queue_capacity,
            self.overflow_policy,
            self.on_overflow,
            Arc::clone(&metrics),
        ));

        Logger {
            node: Arc::new(LoggerNode {
                id: LoggerId::next(),
                sinks: RwLock::new(self.sinks),
                prefix: RwLock::new(
                    self.prefix
                        .unwrap_or_else(|| prefix::timestamp(TimestampFormat::default())),
                ),
                tags: Arc::new(RwLock::new(self.tags)),
                error_reporting: self.error_reporting,
                dispatcher,
                exit_hook: self
                    .exit_hook
                    .unwrap_or_else(|| Arc::new(|code| std::process::exit(code))),
                metrics,
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
