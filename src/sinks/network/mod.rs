//! Network sink for token-based log collectors
//!
//! Keeps one TCP connection to the collector, dialled lazily on the first
//! write and replaced when the liveness probe finds it dead. Records are
//! framed as `<token> [<prefix>] <message>\n`, see [`crate::core::framer`].

pub mod config;

pub use config::{NetworkConfig, DEFAULT_DIAL_TIMEOUT};

use crate::core::{framer, LoggerError, Result, Sink};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

/// Sink writing framed records to a remote collector over TCP
///
/// Every operation runs under one lock, so a probe, a dial and a write never
/// overlap on the same connection. Nothing is retried: dial and write errors
/// go straight back to the caller.
///
/// # Example
///
/// ```no_run
/// use logfanout::sinks::NetworkSink;
/// use logfanout::Sink;
///
/// let sink = NetworkSink::connect_to("2bfbea1e-10c3", "data.logentries.com", 10000)
///     .expect("token, host and port are set");
///
/// // Dials on first use.
/// sink.write(b"deploy finished\n").expect("collector reachable");
/// assert!(sink.is_connected());
/// ```
pub struct NetworkSink {
    state: Mutex<ConnectionState>,
}

struct ConnectionState {
    config: NetworkConfig,
    conn: Option<TcpStream>,
    last_error: Option<String>,
}

impl NetworkSink {
    /// Unconfigured sink; call [`configure`](Self::configure) before use
    pub fn new() -> Self {
        Self::with_state(NetworkConfig::default())
    }

    /// Configured sink that dials on first write
    pub fn connect_to(token: impl Into<String>, host: impl Into<String>, port: u16) -> Result<Self> {
        Self::from_config(NetworkConfig::new(token, host, port))
    }

    pub fn from_config(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_state(config))
    }

    fn with_state(config: NetworkConfig) -> Self {
        Self {
            state: Mutex::new(ConnectionState {
                config,
                conn: None,
                last_error: None,
            }),
        }
    }

    /// Set the collector token and endpoint
    ///
    /// Prefix and timeouts are kept. An existing connection is released so
    /// the next write dials the new endpoint.
    pub fn configure(&self, token: impl Into<String>, host: impl Into<String>, port: u16) -> Result<()> {
        let mut state = self.state.lock();
        let config = NetworkConfig {
            token: token.into(),
            host: host.into(),
            port,
            ..state.config.clone()
        };
        config.validate()?;

        state.config = config;
        state.release();
        Ok(())
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.state.lock().config.prefix = prefix.into();
    }

    pub fn prefix(&self) -> String {
        self.state.lock().config.prefix.clone()
    }

    /// `host:port` of the collector
    pub fn endpoint(&self) -> String {
        self.state.lock().config.endpoint()
    }

    /// Most recent dial or write failure, cleared by a successful dial
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Dial the collector
    ///
    /// Fails with [`LoggerError::AlreadyConnected`] whenever a connection is
    /// held, even one the remote end has closed. Use
    /// [`ensure_open_connection`](Self::ensure_open_connection) to replace a
    /// dead connection.
    pub fn open(&self) -> Result<()> {
        self.state.lock().open()
    }

    /// Check the connection without a protocol exchange
    ///
    /// Peeks one byte in non-blocking mode. "Nothing to read yet" means the
    /// socket is alive and idle; end of stream, an error, or unexpected
    /// inbound data all count as dead. This spots peers that closed or reset
    /// the connection. It cannot tell a half-open or congested connection
    /// from a healthy one.
    ///
    /// The probe consumes nothing, so repeated calls leave a live connection
    /// untouched.
    pub fn probe_alive(&self) -> bool {
        self.state.lock().probe_alive()
    }

    /// Same as [`probe_alive`](Self::probe_alive)
    pub fn is_connected(&self) -> bool {
        self.probe_alive()
    }

    /// Dial unless a live connection is held, discarding a dead one first
    pub fn ensure_open_connection(&self) -> Result<()> {
        self.state.lock().ensure_open()
    }

    /// Frame `payload` and send it, dialling first if needed
    ///
    /// Returns the number of framed bytes sent. A failed write discards the
    /// connection so the next write dials again.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.send(payload)
    }
}

impl Default for NetworkSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    fn open(&mut self) -> Result<()> {
        self.config.validate()?;
        if self.conn.is_some() {
            return Err(LoggerError::AlreadyConnected);
        }

        match dial(&self.config) {
            Ok(stream) => {
                log::debug!("logfanout: connected to {}", self.config.endpoint());
                self.conn = Some(stream);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(LoggerError::io_operation(
                    "connecting to log collector",
                    self.config.endpoint(),
                    e,
                ))
            }
        }
    }

    fn probe_alive(&mut self) -> bool {
        let Some(stream) = self.conn.as_ref() else {
            return false;
        };
        if stream.set_nonblocking(true).is_err() {
            return false;
        }

        let mut byte = [0u8; 1];
        let alive = matches!(
            stream.peek(&mut byte),
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock
        );

        // Writes must stay blocking.
        if stream.set_nonblocking(false).is_err() {
            return false;
        }
        alive
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.probe_alive() {
            return Ok(());
        }
        if self.conn.is_some() {
            log::debug!(
                "logfanout: connection to {} is no longer alive, redialling",
                self.config.endpoint()
            );
            self.release();
        }
        self.open()
    }

    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        let framed = framer::frame(&self.config.token, &self.config.prefix, payload);
        let stream = self.conn.as_mut().ok_or(LoggerError::NotConnected)?;

        match stream.write_all(&framed) {
            Ok(()) => Ok(framed.len()),
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.release();
                Err(LoggerError::io_operation(
                    "writing to log collector",
                    self.config.endpoint(),
                    e,
                ))
            }
        }
    }

    fn release(&mut self) {
        if let Some(stream) = self.conn.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Connect to the first reachable address of the configured endpoint
fn dial(config: &NetworkConfig) -> io::Result<TcpStream> {
    let timeout = config.dial_timeout();
    let mut last_err = None;

    for addr in (config.host.as_str(), config.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                stream.set_write_timeout(config.write_timeout())?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no addresses resolved for {}", config.endpoint()),
        )
    }))
}

impl Sink for NetworkSink {
    fn write(&self, record: &[u8]) -> Result<usize> {
        NetworkSink::write(self, record)
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(stream) = state.conn.as_mut() {
            stream.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "network"
    }
}

impl Drop for NetworkSink {
    fn drop(&mut self) {
        let _ = Sink::flush(self);
    }
}
