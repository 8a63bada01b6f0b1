use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// The content source was unavailable or returned something unusable.
    #[error("upstream fetch error: {0}")]
    Fetch(String),

    /// The classifier call failed or its response did not match the batch.
    #[error("classification error: {0}")]
    Classification(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    /// A required request field was missing or out of range.
    #[error("validation error: {0}")]
    Validation(String),
}
