//! Sentiment labels and the fixed four-slot map keyed by them.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of labels a classifier may assign to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Mixed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Mixed => "mixed",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sentiment label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for SentimentLabel {
    type Err = ParseLabelError;

    /// Labels are matched case-insensitively, so `POSITIVE`, `Positive` and
    /// `positive` all resolve to [`SentimentLabel::Positive`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SentimentLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// One value per [`SentimentLabel`].
///
/// Serializes as a JSON object with the four lowercase label keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMap<T> {
    pub positive: T,
    pub negative: T,
    pub neutral: T,
    pub mixed: T,
}

/// Per-label item counts.
pub type SentimentCounts = LabelMap<u32>;
/// Per-label representative example text.
pub type SentimentExamples = LabelMap<String>;
/// Per-label confidence backing the current example.
pub type SentimentConfidences = LabelMap<f64>;

impl<T> LabelMap<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> LabelMap<U> {
        LabelMap {
            positive: f(self.positive),
            negative: f(self.negative),
            neutral: f(self.neutral),
            mixed: f(self.mixed),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, &T)> + '_ {
        SentimentLabel::ALL.into_iter().map(move |label| (label, &self[label]))
    }
}

impl<T> Index<SentimentLabel> for LabelMap<T> {
    type Output = T;

    fn index(&self, label: SentimentLabel) -> &T {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
            SentimentLabel::Mixed => &self.mixed,
        }
    }
}

impl<T> IndexMut<SentimentLabel> for LabelMap<T> {
    fn index_mut(&mut self, label: SentimentLabel) -> &mut T {
        match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Negative => &mut self.negative,
            SentimentLabel::Neutral => &mut self.neutral,
            SentimentLabel::Mixed => &mut self.mixed,
        }
    }
}
