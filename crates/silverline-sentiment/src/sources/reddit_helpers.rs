//! Reddit listing helpers: post conversion and window filtering.

use chrono::{DateTime, Utc};

use super::reddit::Post;
use crate::types::{truncate_chars, DayWindow, MAX_ITEM_CHARS};

/// Upper bound on the listing page size Reddit accepts.
pub(super) const MAX_PAGE_LIMIT: usize = 100;

/// Title text of a post, truncated for the classifier. Skips blank and
/// moderator-removed titles.
pub(super) fn to_text(post: &Post) -> Option<String> {
    let title = post.data.title.as_deref()?.trim();
    if title.is_empty() || title == "[removed]" || title == "[deleted]" {
        return None;
    }
    Some(truncate_chars(title, MAX_ITEM_CHARS))
}

pub(super) fn created_at(post: &Post) -> Option<DateTime<Utc>> {
    let secs = post.data.created_utc?;
    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

/// Whether a post falls inside `window`. Posts without a timestamp never do.
pub(super) fn in_window(post: &Post, window: &DayWindow) -> bool {
    created_at(post).is_some_and(|at| window.contains(at))
}

/// The path segment for a search scoped to `subreddit`.
pub(super) fn search_path(subreddit: &str) -> String {
    format!("/r/{}/search", subreddit.trim_start_matches("r/"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::super::reddit::PostData;
    use super::*;

    fn post(title: Option<&str>, created_utc: Option<f64>) -> Post {
        Post {
            data: PostData {
                title: title.map(str::to_string),
                created_utc,
            },
        }
    }

    #[test]
    fn to_text_truncates_long_titles() {
        let long = "x".repeat(1_000);
        let text = to_text(&post(Some(&long), None)).expect("text");
        assert_eq!(text.len(), MAX_ITEM_CHARS);
    }

    #[test]
    fn to_text_skips_blank_and_removed() {
        assert!(to_text(&post(None, None)).is_none());
        assert!(to_text(&post(Some("   "), None)).is_none());
        assert!(to_text(&post(Some("[removed]"), None)).is_none());
    }

    #[test]
    fn in_window_uses_created_utc() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let window = DayWindow::days_ago(now, 2);
        #[allow(clippy::cast_precision_loss)]
        let inside = (now.timestamp() - 36 * 3600) as f64;
        #[allow(clippy::cast_precision_loss)]
        let outside = (now.timestamp() - 12 * 3600) as f64;

        assert!(in_window(&post(Some("a"), Some(inside)), &window));
        assert!(!in_window(&post(Some("b"), Some(outside)), &window));
        assert!(!in_window(&post(Some("c"), None), &window));
    }

    #[test]
    fn search_path_accepts_prefixed_names() {
        assert_eq!(search_path("rust"), "/r/rust/search");
        assert_eq!(search_path("r/rust"), "/r/rust/search");
    }
}
