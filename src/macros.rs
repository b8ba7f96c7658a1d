//! Formatting macros for the async and fatal write paths.
//!
//! # Examples
//!
//! ```
//! use logfanout::prelude::*;
//! use logfanout::{logln, printf};
//!
//! let logger = Logger::new();
//!
//! let port = 8080;
//! printf!(logger, "listening on port {}\n", port);
//!
//! // Operands are joined by single spaces
//! logln!(logger, "worker", 3, "ready");
//! ```

/// Format the arguments and queue the result without a trailing newline.
///
/// # Examples
///
/// ```
/// # use logfanout::prelude::*;
/// # let logger = Logger::new();
/// use logfanout::printf;
/// printf!(logger, "cache hit ratio {:.2}\n", 0.93);
/// ```
#[macro_export]
macro_rules! printf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.printf(format_args!($($arg)+))
    };
}

/// Join the operands with spaces and queue them as one line.
///
/// # Examples
///
/// ```
/// # use logfanout::prelude::*;
/// # let logger = Logger::new();
/// use logfanout::logln;
/// logln!(logger, "shutdown requested by", "signal", 15);
/// logln!(logger);
/// ```
#[macro_export]
macro_rules! logln {
    ($logger:expr) => {
        $logger.println("")
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.println($crate::__join_operands!($($arg),+))
    };
}

/// Join the operands with spaces, write them synchronously, then exit.
///
/// # Examples
///
/// ```
/// # use logfanout::prelude::*;
/// # use std::sync::Arc;
/// # let logger = Logger::builder().exit_hook(Arc::new(|_| {})).build();
/// use logfanout::fatalln;
/// fatalln!(logger, "config file missing:", "/etc/app.toml");
/// ```
#[macro_export]
macro_rules! fatalln {
    ($logger:expr) => {
        $logger.fatalln("")
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.fatalln($crate::__join_operands!($($arg),+))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __join_operands {
    ($($arg:expr),+) => {{
        let parts: ::std::vec::Vec<::std::string::String> =
            ::std::vec![$(::std::string::ToString::to_string(&$arg)),+];
        parts.join(" ")
    }};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    fn capture() -> (Logger, Arc<WriterSink<Vec<u8>>>) {
        let sink = Arc::new(WriterSink::new(Vec::new()));
        let logger = Logger::builder()
            .prefix_generator(prefix::empty())
            .shared_sink(Arc::clone(&sink) as Arc<dyn Sink>)
            .build();
        (logger, sink)
    }

    fn contents(sink: &WriterSink<Vec<u8>>) -> String {
        sink.with_inner(|buf| String::from_utf8_lossy(buf).into_owned())
    }

    #[test]
    fn test_printf_macro() {
        let (logger, sink) = capture();
        printf!(logger, "{}={}", "retries", 3);
        assert!(logger.drain(Duration::from_secs(5)));
        assert_eq!(contents(&sink), "retries=3");
    }

    #[test]
    fn test_logln_joins_with_spaces() {
        let (logger, sink) = capture();
        logln!(logger, "worker", 7, 'x', 1.5);
        assert!(logger.drain(Duration::from_secs(5)));
        assert_eq!(contents(&sink), "worker 7 x 1.5\n");
    }

    #[test]
    fn test_logln_without_operands() {
        let (logger, sink) = capture();
        logln!(logger);
        assert!(logger.drain(Duration::from_secs(5)));
        assert_eq!(contents(&sink), "\n");
    }

    #[test]
    fn test_fatalln_macro_calls_exit_hook() {
        let code = Arc::new(Mutex::new(None));
        let code_clone = Arc::clone(&code);
        let sink = Arc::new(WriterSink::new(Vec::new()));
        let logger = Logger::builder()
            .prefix_generator(prefix::empty())
            .shared_sink(Arc::clone(&sink) as Arc<dyn Sink>)
            .exit_hook(Arc::new(move |c| *code_clone.lock() = Some(c)))
            .build();

        fatalln!(logger, "cannot bind", 443);

        assert_eq!(*code.lock(), Some(1));
        assert_eq!(contents(&sink), "cannot bind 443\n");
    }
}
