//! Shapes an aggregation into the persistable [`ApprovalRecord`].

use chrono::NaiveDate;
use silverline_core::{format_record_date, record_id, ApprovalRecord};

use crate::aggregate::{calculate_approval_rating, Aggregation};
use crate::profanity::censor;

/// Build the record for `keyword`/`subreddit` on `date`.
///
/// Each example is censored independently. Pure: persistence is the
/// caller's job.
#[must_use]
pub fn build_record(
    keyword: &str,
    subreddit: &str,
    date: NaiveDate,
    aggregation: &Aggregation,
) -> ApprovalRecord {
    ApprovalRecord {
        id: record_id(keyword, subreddit, date),
        keyword: keyword.to_string(),
        subreddit: subreddit.to_string(),
        date: format_record_date(date),
        approval_rating: calculate_approval_rating(&aggregation.counts),
        sentiments_breakdown: aggregation.counts.clone(),
        comments: aggregation.examples.clone().map(|text| censor(&text)),
    }
}
