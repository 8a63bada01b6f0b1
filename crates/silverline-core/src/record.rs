//! The persisted per-day approval record and its natural key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sentiment::{SentimentCounts, SentimentExamples};

/// Subreddit value used when the caller does not name one.
pub const ALL_SUBREDDITS: &str = "all";

const RECORD_DATE_FORMAT: &str = "%Y%m%d";

/// One approval rating for a (keyword, subreddit, day) triple.
///
/// `id` is `{keyword}_{subreddit}_{date}` and is the primary key in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub id: String,
    pub keyword: String,
    pub subreddit: String,
    /// `YYYYMMDD`.
    pub date: String,
    /// Weighted approval in `[0, 100]`.
    pub approval_rating: f64,
    pub sentiments_breakdown: SentimentCounts,
    /// Highest-confidence example per label, profanity-redacted.
    pub comments: SentimentExamples,
}

/// Format a day as the 8-digit `YYYYMMDD` string used in record ids.
#[must_use]
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

#[must_use]
pub fn record_id(keyword: &str, subreddit: &str, date: NaiveDate) -> String {
    format!("{keyword}_{subreddit}_{}", format_record_date(date))
}

/// Empty or whitespace-only subreddits mean "search everywhere".
#[must_use]
pub fn normalize_subreddit(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ALL_SUBREDDITS.to_string()
    } else {
        trimmed.to_string()
    }
}
