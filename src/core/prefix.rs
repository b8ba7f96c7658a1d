//! Prefix generators decorating every record a logger emits

use super::timestamp::TimestampFormat;
use std::sync::Arc;

/// Produces the decoration placed in front of each record
///
/// An empty string means "no prefix": the logger then writes the payload
/// without a separating space.
pub type PrefixGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Current time rendered with `format`
///
/// # Examples
///
/// ```
/// use logfanout::core::{prefix, TimestampFormat};
///
/// let generate = prefix::timestamp(TimestampFormat::UnixMillis);
/// assert!(generate().parse::<i64>().is_ok());
/// ```
pub fn timestamp(format: TimestampFormat) -> PrefixGenerator {
    Arc::new(move || format.now())
}

pub fn empty() -> PrefixGenerator {
    Arc::new(String::new)
}

pub fn fixed(text: impl Into<String>) -> PrefixGenerator {
    let text = text.into();
    Arc::new(move || text.clone())
}

/// Tags joined by single spaces, the default for child loggers
pub fn tags<I, S>(tags: I) -> PrefixGenerator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fixed(tags.into_iter().map(Into::into).collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prefix() {
        assert_eq!(empty()(), "");
    }

    #[test]
    fn test_fixed_prefix() {
        let generate = fixed("worker-3");
        assert_eq!(generate(), "worker-3");
        assert_eq!(generate(), "worker-3");
    }

    #[test]
    fn test_tags_prefix() {
        assert_eq!(tags(["req=42", "api"])(), "req=42 api");
        assert_eq!(tags(Vec::<String>::new())(), "");
    }

    #[test]
    fn test_timestamp_prefix_uses_format() {
        let generate = timestamp(TimestampFormat::Custom("%Y".to_string()));
        assert_eq!(generate().len(), 4);
    }
}
