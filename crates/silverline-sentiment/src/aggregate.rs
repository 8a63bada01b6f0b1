//! Reduces classified items into counts, examples and an approval rating.

use silverline_core::{SentimentConfidences, SentimentCounts, SentimentExamples};

use crate::types::ClassifiedItem;

const POSITIVE_WEIGHT: u64 = 2;
const MIXED_WEIGHT: u64 = 1;
const NEGATIVE_WEIGHT: u64 = 0;

/// Per-label tallies for one analysis window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub counts: SentimentCounts,
    /// Text of the highest-confidence item seen for each label.
    pub examples: SentimentExamples,
    /// Confidence that justified each stored example.
    pub confidences: SentimentConfidences,
}

/// Fold `items` in order into an [`Aggregation`].
///
/// An item replaces its label's example only when the score for its own
/// label is strictly greater than the stored one, so on an exact tie the
/// first item seen keeps the slot. Labels with no items keep a zero count
/// and an empty example.
#[must_use]
pub fn aggregate(items: &[ClassifiedItem]) -> Aggregation {
    let mut agg = Aggregation::default();

    for item in items {
        let label = item.label;
        agg.counts[label] += 1;

        let confidence = item.confidence[label];
        if confidence > agg.confidences[label] {
            agg.examples[label].clone_from(&item.text);
            agg.confidences[label] = confidence;
        }
    }

    agg
}

/// Weighted approval in `[0, 100]`.
///
/// Positive counts 2, mixed 1, negative 0; neutral items are left out of
/// both numerator and denominator. Returns exactly `0.0` when there are no
/// positive, negative or mixed items.
#[must_use]
pub fn calculate_approval_rating(counts: &SentimentCounts) -> f64 {
    let positive = u64::from(counts.positive);
    let negative = u64::from(counts.negative);
    let mixed = u64::from(counts.mixed);

    let denominator = (positive + negative + mixed) * POSITIVE_WEIGHT;
    if denominator == 0 {
        return 0.0;
    }

    let numerator = positive * POSITIVE_WEIGHT + negative * NEGATIVE_WEIGHT + mixed * MIXED_WEIGHT;

    #[allow(clippy::cast_precision_loss)]
    let (numerator, denominator) = (numerator as f64, denominator as f64);
    (numerator * 100.0) / denominator
}
