//! Local sinks: standard output and arbitrary writers

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::io::{self, Write};

/// Writes records straight to the process's standard output
///
/// No framing and no buffering: every record is flushed as it is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        StdoutSink
    }
}

impl Sink for StdoutSink {
    fn write(&self, record: &[u8]) -> Result<usize> {
        let mut out = io::stdout().lock();
        out.write_all(record)?;
        out.flush()?;
        Ok(record.len())
    }

    fn flush(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Passthrough sink for any `io::Write`
///
/// # Example
///
/// ```
/// use logfanout::sinks::WriterSink;
/// use logfanout::Sink;
///
/// let sink = WriterSink::new(Vec::new());
/// sink.write(b"hello\n").unwrap();
/// assert_eq!(sink.into_inner(), b"hello\n");
/// ```
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            name: "writer".to_string(),
        }
    }

    /// Name reported in broadcast errors
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run `f` against the wrapped writer while holding its lock
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.lock())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, record: &[u8]) -> Result<usize> {
        self.writer.lock().write_all(record)?;
        Ok(record.len())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_passes_bytes_through() {
        let sink = WriterSink::new(Vec::new());

        assert_eq!(sink.write(b"a\nb\n").unwrap(), 4);
        assert_eq!(sink.write(b"c").unwrap(), 1);

        assert_eq!(sink.into_inner(), b"a\nb\nc");
    }

    #[test]
    fn test_writer_sink_surfaces_io_errors() {
        let sink = WriterSink::new(BrokenPipe).with_name("pipe");

        let err = sink.write(b"x").expect_err("pipe is broken");

        assert!(matches!(err, LoggerError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(sink.name(), "pipe");
    }

    #[test]
    fn test_stdout_sink_reports_full_length() {
        let sink = StdoutSink::new();
        assert_eq!(sink.write(b"").unwrap(), 0);
        assert_eq!(sink.name(), "stdout");
        sink.flush().unwrap();
    }
}
