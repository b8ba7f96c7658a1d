//! Wire framing for token-based line collectors
//!
//! The collector treats a bare `\n` as the end of a record, so a multi-line
//! payload has every newline but the last rewritten to U+2028 LINE SEPARATOR.
//! The framed record has the shape:
//!
//! ```text
//! <token> [<prefix>] <payload>
//! ```

/// Code point substituted for embedded newlines
pub const LINE_SEPARATOR: char = '\u{2028}';

const LINE_SEPARATOR_UTF8: &[u8] = "\u{2028}".as_bytes();

/// Replace all newlines except the last one with [`LINE_SEPARATOR`]
///
/// Payloads without a newline are returned unchanged and no terminator is
/// appended.
///
/// # Examples
///
/// ```
/// use logfanout::core::framer::normalize_newlines;
///
/// assert_eq!(normalize_newlines(b"a\nb\nc\n"), "a\u{2028}b\u{2028}c\n".as_bytes());
/// assert_eq!(normalize_newlines(b"single line"), b"single line");
/// ```
#[must_use]
pub fn normalize_newlines(payload: &[u8]) -> Vec<u8> {
    let newlines = payload.iter().filter(|&&b| b == b'\n').count();
    let mut to_replace = newlines.saturating_sub(1);

    let mut out = Vec::with_capacity(payload.len() + to_replace * (LINE_SEPARATOR_UTF8.len() - 1));
    for &byte in payload {
        if byte == b'\n' && to_replace > 0 {
            out.extend_from_slice(LINE_SEPARATOR_UTF8);
            to_replace -= 1;
        } else {
            out.push(byte);
        }
    }
    out
}

/// Build the wire record for one write
///
/// # Examples
///
/// ```
/// use logfanout::core::framer::frame;
///
/// let framed = frame("abc-123", "api", b"request done\n");
/// assert_eq!(framed, b"abc-123 [api] request done\n");
/// ```
#[must_use]
pub fn frame(token: &str, prefix: &str, payload: &[u8]) -> Vec<u8> {
    let body = normalize_newlines(payload);

    let mut buf = Vec::with_capacity(token.len() + prefix.len() + body.len() + 4);
    buf.extend_from_slice(token.as_bytes());
    buf.push(b' ');
    buf.push(b'[');
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(b"] ");
    buf.extend_from_slice(&body);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separators(bytes: &[u8]) -> usize {
        String::from_utf8_lossy(bytes).matches(LINE_SEPARATOR).count()
    }

    #[test]
    fn test_multi_line_payload_keeps_one_terminator() {
        let framed = frame("tok", "app", b"a\nb\nc\n");

        assert_eq!(framed, "tok [app] a\u{2028}b\u{2028}c\n".as_bytes());
        assert_eq!(separators(&framed), 2);
        assert_eq!(framed.iter().filter(|&&b| b == b'\n').count(), 1);
        assert_eq!(framed.last(), Some(&b'\n'));
    }

    #[test]
    fn test_payload_without_newline_is_untouched() {
        let framed = frame("tok", "", b"no newline here");

        assert_eq!(framed, b"tok [] no newline here");
        assert_eq!(separators(&framed), 0);
    }

    #[test]
    fn test_single_newline_is_kept_where_it_is() {
        assert_eq!(normalize_newlines(b"head\ntail"), b"head\ntail");
        assert_eq!(normalize_newlines(b"line\n"), b"line\n");
    }

    #[test]
    fn test_last_newline_survives_even_when_not_trailing() {
        let out = normalize_newlines(b"a\nb\nc");
        assert_eq!(out, "a\u{2028}b\nc".as_bytes());
    }

    #[test]
    fn test_empty_payload() {
        assert!(normalize_newlines(b"").is_empty());
        assert_eq!(frame("t", "p", b""), b"t [p] ");
    }

    #[test]
    fn test_non_ascii_payload_survives() {
        let framed = frame("t", "p", "héllo\nwörld\n".as_bytes());
        assert_eq!(framed, "t [p] héllo\u{2028}wörld\n".as_bytes());
    }
}
