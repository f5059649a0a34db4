//! Event slug generation
//!
//! Slugs look like `2026-2-18-press-conference`: the event's local date
//! without zero padding, then a transliterated, URL-safe title.

use std::future::Future;
use std::sync::OnceLock;
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use crate::utils::errors::Result;
use crate::utils::helpers::local_offset;

/// Longest title component kept in a slug
pub const MAX_TITLE_SLUG_LEN: usize = 50;

/// Chinese event nouns and their slug form, applied in this order
const EVENT_NOUNS: &[(&str, &str)] = &[
    ("記者會", "press-conference"),
    ("發表會", "launch-event"),
    ("研討會", "seminar"),
    ("論壇", "forum"),
    ("會議", "conference"),
    ("工作坊", "workshop"),
    ("活動", "event"),
    ("講座", "lecture"),
    ("展覽", "exhibition"),
    ("派對", "party"),
    ("聚會", "meetup"),
    ("年會", "annual-meeting"),
];

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[^a-z0-9]+").expect("static slug pattern compiles"))
}

/// Build the base slug for an event starting at `date`, using the site's
/// local calendar day
pub fn generate_slug(date: DateTime<Utc>, title: &str, utc_offset_minutes: i32) -> String {
    let local = date.with_timezone(&local_offset(utc_offset_minutes));
    let date_part = format!("{}-{}-{}", local.year(), local.month(), local.day());

    let title_part = title_slug(title);
    let title_part = if title_part.is_empty() { "event" } else { title_part.as_str() };

    format!("{}-{}", date_part, title_part)
}

/// Title component of a slug; empty when nothing usable remains
pub fn title_slug(title: &str) -> String {
    let mut slug = title.to_lowercase().trim().to_string();

    for (noun, replacement) in EVENT_NOUNS {
        slug = slug.replace(noun, replacement);
    }

    slug.retain(|c| c.is_ascii());

    let slug = separator_pattern().replace_all(&slug, "-");
    slug.trim_matches('-').chars().take(MAX_TITLE_SLUG_LEN).collect()
}

/// Append `-1`, `-2`, ... to `base` until `exists` reports the slug free.
///
/// Two concurrent creations can still pick the same suffix; the unique
/// index on `events.slug` rejects the loser.
pub async fn ensure_unique_slug<F, Fut>(base: &str, mut exists: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut slug = base.to_string();
    let mut counter = 1u32;

    while exists(slug.clone()).await? {
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn feb_18() -> DateTime<Utc> {
        // 2026-02-18 10:00 at UTC+8
        Utc.with_ymd_and_hms(2026, 2, 18, 2, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_slug_translates_event_nouns() {
        assert_eq!(generate_slug(feb_18(), "記者會", 480), "2026-2-18-press-conference");
        assert_eq!(generate_slug(feb_18(), "AI 研討會 2026", 480), "2026-2-18-ai-seminar-2026");
        assert_eq!(generate_slug(feb_18(), "年度派對", 480), "2026-2-18-party");
    }

    #[test]
    fn test_generate_slug_falls_back_to_event() {
        assert_eq!(generate_slug(feb_18(), "", 480), "2026-2-18-event");
        assert_eq!(generate_slug(feb_18(), "春酒", 480), "2026-2-18-event");
        assert_eq!(generate_slug(feb_18(), "!!!", 480), "2026-2-18-event");
    }

    #[test]
    fn test_generate_slug_uses_local_date() {
        let late_evening_utc = Utc.with_ymd_and_hms(2026, 2, 17, 20, 0, 0).unwrap();
        assert_eq!(generate_slug(late_evening_utc, "Meetup", 480), "2026-2-18-meetup");
        assert_eq!(generate_slug(late_evening_utc, "Meetup", 0), "2026-2-17-meetup");
    }

    #[test]
    fn test_title_slug_truncates() {
        let title = "a".repeat(80);
        assert_eq!(title_slug(&title).len(), MAX_TITLE_SLUG_LEN);
    }

    #[tokio::test]
    async fn test_ensure_unique_slug_appends_counter() {
        let taken = ["2026-2-18-event", "2026-2-18-event-1"];
        let slug = ensure_unique_slug("2026-2-18-event", |candidate| async move {
            Ok(taken.contains(&candidate.as_str()))
        })
        .await
        .unwrap();

        assert_eq!(slug, "2026-2-18-event-2");
    }

    #[tokio::test]
    async fn test_ensure_unique_slug_keeps_free_base() {
        let slug = ensure_unique_slug("2026-2-18-forum", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "2026-2-18-forum");
    }

    proptest! {
        #[test]
        fn title_slug_is_url_safe(title in "\\PC{0,120}") {
            let slug = title_slug(&title);
            prop_assert!(slug.len() <= MAX_TITLE_SLUG_LEN);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
