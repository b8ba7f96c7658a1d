//! Helpers for HTTP access logging
//!
//! Request instrumentation lives outside this crate. These are the pieces it
//! needs from the logger side: resolving the client address and rendering a
//! finished request as one access line for [`Logger::print`](crate::Logger::print).

use std::fmt::Write as _;
use std::time::Duration;

/// Resolve the client address of a request
///
/// Prefers `X-Real-IP`, then `X-Forwarded-For`, then the peer address.
/// Header names match case-insensitively and empty values are skipped.
///
/// # Example
///
/// ```
/// use logfanout::access::client_ip;
///
/// let headers = [("x-forwarded-for", "203.0.113.9")];
/// assert_eq!(client_ip(headers, "10.0.0.2:51000"), "203.0.113.9");
/// assert_eq!(client_ip([], "10.0.0.2:51000"), "10.0.0.2:51000");
/// ```
pub fn client_ip<'a, I>(headers: I, remote_addr: &'a str) -> &'a str
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut real_ip = None;
    let mut forwarded_for = None;

    for (name, value) in headers {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if real_ip.is_none() && name.eq_ignore_ascii_case("X-Real-IP") {
            real_ip = Some(value);
        } else if forwarded_for.is_none() && name.eq_ignore_ascii_case("X-Forwarded-For") {
            forwarded_for = Some(value);
        }
    }

    real_ip.or(forwarded_for).unwrap_or(remote_addr)
}

/// One completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub request_id: Option<String>,
    pub status: u16,
    pub latency: Duration,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    /// Error text attached by handlers, printed on the following line
    pub errors: String,
}

impl AccessRecord {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        latency: Duration,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            request_id: None,
            status,
            latency,
            client_ip: client_ip.into(),
            method: method.into(),
            path: path.into(),
            errors: String::new(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.request_id = (!id.is_empty()).then_some(id);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: impl Into<String>) -> Self {
        self.errors = errors.into();
        self
    }

    /// `| <id> | 200 | 1.2ms | <ip> | GET /path\n<errors>`
    pub fn render_plain(&self) -> String {
        self.render(format!("{:3}", self.status), self.method.clone())
    }

    /// Same layout with coloured status and method badges
    #[cfg(feature = "console")]
    pub fn render_colored(&self) -> String {
        use crate::colors::{badge, method_color, status_color};

        self.render(
            badge(&format!(" {:3} ", self.status), Some(status_color(self.status))),
            badge(&format!(" {} ", self.method), method_color(&self.method)),
        )
    }

    fn render(&self, status: String, method: String) -> String {
        let mut line = String::new();
        if let Some(ref id) = self.request_id {
            let _ = write!(line, "| {} ", id);
        }
        let _ = write!(
            line,
            "| {} | {:>8?} | {} | {} {}\n{}",
            status,
            self.latency,
            self.client_ip,
            method,
            self.path,
            self.errors
        );
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_ip_wins() {
        let headers = [
            ("X-Forwarded-For", "198.51.100.1"),
            ("X-Real-IP", "203.0.113.7"),
        ];
        assert_eq!(client_ip(headers, "10.0.0.1:4000"), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_is_second_choice() {
        let headers = [("Accept", "*/*"), ("X-Forwarded-For", "198.51.100.1")];
        assert_eq!(client_ip(headers, "10.0.0.1:4000"), "198.51.100.1");
    }

    #[test]
    fn test_empty_headers_fall_back_to_peer() {
        let headers = [("X-Real-IP", ""), ("X-Forwarded-For", "  ")];
        assert_eq!(client_ip(headers, "10.0.0.1:4000"), "10.0.0.1:4000");
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        assert_eq!(client_ip([("x-real-ip", "192.0.2.4")], "peer"), "192.0.2.4");
    }

    #[test]
    fn test_render_plain() {
        let record = AccessRecord::new("GET", "/health", 200, Duration::from_millis(3), "192.0.2.4");
        assert_eq!(
            record.render_plain(),
            "| 200 |      3ms | 192.0.2.4 | GET /health\n"
        );
    }

    #[test]
    fn test_render_with_request_id_and_errors() {
        let record = AccessRecord::new("POST", "/orders", 500, Duration::from_micros(1500), "ip")
            .with_request_id("f3a9")
            .with_errors("Error #01: db timeout\n");

        assert_eq!(
            record.render_plain(),
            "| f3a9 | 500 |    1.5ms | ip | POST /orders\nError #01: db timeout\n"
        );
    }

    #[test]
    fn test_empty_request_id_is_ignored() {
        let record = AccessRecord::new("GET", "/", 204, Duration::ZERO, "ip").with_request_id("");
        assert!(record.request_id.is_none());
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_render_colored_keeps_layout() {
        colored::control::set_override(true);
        let record = AccessRecord::new("DELETE", "/items/9", 404, Duration::from_millis(12), "ip");

        let line = record.render_colored();

        assert!(line.contains(" 404 "));
        assert!(line.contains(" DELETE "));
        assert!(line.ends_with("/items/9\n"));
    }
}
