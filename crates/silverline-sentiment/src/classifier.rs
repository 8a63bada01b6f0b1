//! Client for the external batch sentiment classifier.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use silverline_core::{LabelMap, SentimentLabel};

use crate::batch::BATCH_SIZE;
use crate::error::SentimentError;
use crate::types::BatchResult;

/// Classifies a batch of at most [`BATCH_SIZE`] texts.
///
/// Results carry the position of their input within `batch`; they may come
/// back in any order and the caller zips them back by index.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, batch: &[String]) -> Result<Vec<BatchResult>, SentimentError>;
}

/// HTTP classifier speaking the batch-detect-sentiment JSON shape.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    language_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BatchDetectRequest<'a> {
    text_list: &'a [String],
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BatchDetectResponse {
    result_list: Vec<ResultItem>,
    #[serde(default)]
    error_list: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultItem {
    index: usize,
    sentiment: String,
    sentiment_score: SentimentScore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SentimentScore {
    positive: f64,
    negative: f64,
    neutral: f64,
    mixed: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorItem {
    index: usize,
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

impl HttpClassifier {
    /// Create a classifier client posting to `{base_url}/batch-detect-sentiment`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Classification`] if the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        language_code: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                SentimentError::Classification(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: format!("{}/batch-detect-sentiment", base_url.trim_end_matches('/')),
            language_code: language_code.to_string(),
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<BatchResult>, SentimentError> {
        if batch.len() > BATCH_SIZE {
            return Err(SentimentError::Classification(format!(
                "batch of {} exceeds the classifier limit of {BATCH_SIZE}",
                batch.len()
            )));
        }

        let request = BatchDetectRequest {
            text_list: batch,
            language_code: &self.language_code,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SentimentError::Classification(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Classification(format!(
                "classifier returned status {}",
                response.status()
            )));
        }

        let body: BatchDetectResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Classification(format!("response parse error: {e}")))?;

        if let Some(first) = body.error_list.first() {
            return Err(SentimentError::Classification(format!(
                "classifier rejected {} item(s); first at index {}: {} {}",
                body.error_list.len(),
                first.index,
                first.error_code,
                first.error_message
            )));
        }

        body.result_list.into_iter().map(to_batch_result).collect()
    }
}

fn to_batch_result(item: ResultItem) -> Result<BatchResult, SentimentError> {
    let label: SentimentLabel = item
        .sentiment
        .parse()
        .map_err(|e| SentimentError::Classification(format!("{e}")))?;

    Ok(BatchResult {
        index: item.index,
        label,
        confidence: LabelMap {
            positive: item.sentiment_score.positive,
            negative: item.sentiment_score.negative,
            neutral: item.sentiment_score.neutral,
            mixed: item.sentiment_score.mixed,
        },
    })
}
