//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Canonical phone lookup key: the input with every non-digit removed
pub fn phone_key(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Fixed offset for the site's local time, falling back to UTC for
/// out-of-range values
pub fn local_offset(utc_offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Format a timestamp in site-local time as `YYYY/M/D HH:MM:SS`
pub fn format_local_timestamp(timestamp: DateTime<Utc>, utc_offset_minutes: i32) -> String {
    timestamp
        .with_timezone(&local_offset(utc_offset_minutes))
        .format("%Y/%-m/%-d %H:%M:%S")
        .to_string()
}

/// Escape text for interpolation into HTML mail bodies
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect()
}

/// Trimmed, non-empty form field
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_phone_key() {
        assert_eq!(phone_key("0912-345-678"), "0912345678");
        assert_eq!(phone_key("+886 912 345 678"), "886912345678");
        assert_eq!(phone_key("--"), "");
    }

    #[test]
    fn test_format_local_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 18, 7, 5, 9).unwrap();
        assert_eq!(format_local_timestamp(ts, 480), "2026/2/18 15:05:09");
        assert_eq!(format_local_timestamp(ts, 0), "2026/2/18 07:05:09");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my photo (1).png"), "myphoto1.png");
        assert_eq!(sanitize_filename("海報.jpg"), ".jpg");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    proptest! {
        #[test]
        fn prop_phone_key_is_digits_and_stable(phone in "\\PC{0,24}") {
            let key = phone_key(&phone);
            prop_assert!(key.chars().all(|c| c.is_ascii_digit()));
            prop_assert_eq!(phone_key(&key), key.clone());
        }

        #[test]
        fn prop_escaped_html_has_no_markup(text in "\\PC{0,64}") {
            let escaped = escape_html(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }
    }
}
