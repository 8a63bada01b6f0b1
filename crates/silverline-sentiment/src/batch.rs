//! Splits fetched texts into classifier-sized batches and merges the results.

use crate::classifier::SentimentClassifier;
use crate::error::SentimentError;
use crate::types::{BatchResult, ClassifiedItem};

/// Hard per-call item limit of the classifier.
pub const BATCH_SIZE: usize = 25;

/// Classify every text, [`BATCH_SIZE`] at a time.
///
/// Output order matches input order regardless of batch boundaries or the
/// order in which the classifier returns results. Any batch failure aborts
/// the whole call. An empty input makes no classifier calls.
///
/// # Errors
///
/// Returns [`SentimentError::Classification`] if a batch call fails or its
/// results cannot be matched one-to-one with the batch inputs.
pub async fn classify_all(
    classifier: &dyn SentimentClassifier,
    texts: &[String],
) -> Result<Vec<ClassifiedItem>, SentimentError> {
    let mut items = Vec::with_capacity(texts.len());

    for (batch_no, chunk) in texts.chunks(BATCH_SIZE).enumerate() {
        let results = classifier.classify(chunk).await?;
        tracing::debug!(
            batch = batch_no,
            size = chunk.len(),
            "classified sentiment batch"
        );
        items.extend(zip_batch(chunk, results)?);
    }

    Ok(items)
}

/// Pair each result with its input text by index.
fn zip_batch(
    chunk: &[String],
    results: Vec<BatchResult>,
) -> Result<Vec<ClassifiedItem>, SentimentError> {
    let mut slots: Vec<Option<BatchResult>> = vec![None; chunk.len()];

    for result in results {
        let index = result.index;
        let slot = slots.get_mut(index).ok_or_else(|| {
            SentimentError::Classification(format!(
                "result index {index} out of range for batch of {}",
                chunk.len()
            ))
        })?;
        if slot.is_some() {
            return Err(SentimentError::Classification(format!(
                "duplicate result for index {index}"
            )));
        }
        *slot = Some(result);
    }

    chunk
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (text, slot))| {
            let result = slot.ok_or_else(|| {
                SentimentError::Classification(format!("missing result for index {index}"))
            })?;
            Ok(ClassifiedItem {
                text: text.clone(),
                label: result.label,
                confidence: result.confidence,
            })
        })
        .collect()
}
