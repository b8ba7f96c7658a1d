//! Terminal colours for HTTP access lines
//!
//! Pure lookups from status code or method to a background colour.

use colored::{Color, Colorize};

/// 2xx green, 3xx white, 4xx yellow, anything else red
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::White,
        400..=499 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Background for a request method; `None` leaves the text uncoloured
pub fn method_color(method: &str) -> Option<Color> {
    match method {
        "GET" => Some(Color::Blue),
        "POST" => Some(Color::Cyan),
        "PUT" => Some(Color::Yellow),
        "DELETE" => Some(Color::Red),
        "PATCH" => Some(Color::Green),
        "HEAD" => Some(Color::Magenta),
        "OPTIONS" => Some(Color::White),
        _ => None,
    }
}

/// Render `text` on `background`
///
/// Bright white text, except on a white background where dark grey stays
/// readable.
pub fn badge(text: &str, background: Option<Color>) -> String {
    match background {
        Some(Color::White) => text.bright_black().on_white().to_string(),
        Some(bg) => text.bright_white().on_color(bg).to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ranges() {
        assert_eq!(status_color(200), Color::Green);
        assert_eq!(status_color(204), Color::Green);
        assert_eq!(status_color(301), Color::White);
        assert_eq!(status_color(404), Color::Yellow);
        assert_eq!(status_color(500), Color::Red);
        assert_eq!(status_color(101), Color::Red);
    }

    #[test]
    fn test_method_table() {
        assert_eq!(method_color("GET"), Some(Color::Blue));
        assert_eq!(method_color("POST"), Some(Color::Cyan));
        assert_eq!(method_color("PUT"), Some(Color::Yellow));
        assert_eq!(method_color("DELETE"), Some(Color::Red));
        assert_eq!(method_color("PATCH"), Some(Color::Green));
        assert_eq!(method_color("HEAD"), Some(Color::Magenta));
        assert_eq!(method_color("OPTIONS"), Some(Color::White));
        assert_eq!(method_color("CONNECT"), None);
        assert_eq!(method_color("get"), None);
    }

    #[test]
    fn test_badge_without_colour_is_plain() {
        assert_eq!(badge("TRACE", None), "TRACE");
    }

    #[test]
    fn test_badge_contains_text() {
        colored::control::set_override(true);
        let painted = badge(" 200 ", Some(status_color(200)));
        assert!(painted.contains(" 200 "));
        assert!(painted.starts_with('\u{1b}'));
    }
}
