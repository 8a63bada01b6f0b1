use async_trait::async_trait;
use silverline_core::{ApprovalRecord, SubscribeOutcome, Subscription};

use crate::error::SentimentError;

/// Keyed persistence for approval records and subscriptions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exact-key lookup.
    async fn get(&self, id: &str) -> Result<Option<ApprovalRecord>, SentimentError>;

    /// Write `record` only if its id is absent. Returns `false` when a
    /// record with the same id already existed and nothing was written.
    async fn insert(&self, record: &ApprovalRecord) -> Result<bool, SentimentError>;

    /// Write `record`, replacing any record with the same id.
    async fn upsert(&self, record: &ApprovalRecord) -> Result<(), SentimentError>;

    /// Every record for the pair, oldest date first.
    async fn list_for_pair(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<Vec<ApprovalRecord>, SentimentError>;

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, SentimentError>;

    async fn subscribe(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<SubscribeOutcome, SentimentError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), SentimentError>;
}
