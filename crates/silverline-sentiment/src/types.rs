use chrono::{DateTime, Duration, Utc};
use silverline_core::{AppConfig, LabelMap, SentimentLabel};

/// Per-item character ceiling imposed by the classifier.
pub const MAX_ITEM_CHARS: usize = 620;

/// One fetched text item with the label the classifier assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedItem {
    pub text: String,
    pub label: SentimentLabel,
    /// Scores for all four labels, regardless of which one won.
    pub confidence: LabelMap<f64>,
}

/// Classifier output for one input of a batch, keyed by its position.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub index: usize,
    pub label: SentimentLabel,
    pub confidence: LabelMap<f64>,
}

/// A half-open `[after, before)` time window used by the backfill path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl DayWindow {
    /// The 24 hours ending `days_ago - 1` days before `now`.
    #[must_use]
    pub fn days_ago(now: DateTime<Utc>, days_ago: u32) -> Self {
        let days = i64::from(days_ago);
        Self {
            after: now - Duration::days(days),
            before: now - Duration::days(days - 1),
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.after && at < self.before
    }
}

/// Knobs for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Items fetched for the synchronous "today" path.
    pub fetch_limit: usize,
    /// Items fetched for one backfill day.
    pub backfill_fetch_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            fetch_limit: 10,
            backfill_fetch_limit: 25,
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            fetch_limit: config.fetch_limit,
            backfill_fetch_limit: config.backfill_fetch_limit,
        }
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
