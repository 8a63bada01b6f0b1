//! Content sources feeding the classifier.

mod reddit;
mod reddit_helpers;

use async_trait::async_trait;

pub use reddit::{RedditClient, RedditCredentials};

use crate::error::SentimentError;
use crate::types::DayWindow;

/// Retrieves text items mentioning a keyword.
///
/// Implementations return at most `limit` items, each no longer than
/// [`crate::MAX_ITEM_CHARS`] characters. With a `window`, only items created
/// inside it are returned.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(
        &self,
        keyword: &str,
        subreddit: &str,
        window: Option<DayWindow>,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError>;
}
