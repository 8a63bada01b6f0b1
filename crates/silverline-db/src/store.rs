//! Postgres-backed [`RecordStore`].

use async_trait::async_trait;
use silverline_core::{ApprovalRecord, SubscribeOutcome, Subscription};
use silverline_sentiment::{RecordStore, SentimentError};
use sqlx::PgPool;

use crate::{approval_records, subscriptions, DbError};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn persistence(err: DbError) -> SentimentError {
    tracing::warn!(error = %err, "record store operation failed");
    SentimentError::Persistence(err.to_string())
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get(&self, id: &str) -> Result<Option<ApprovalRecord>, SentimentError> {
        approval_records::get_approval_record(&self.pool, id)
            .await
            .map_err(persistence)
    }

    async fn insert(&self, record: &ApprovalRecord) -> Result<bool, SentimentError> {
        approval_records::insert_approval_record(&self.pool, record)
            .await
            .map_err(persistence)
    }

    async fn upsert(&self, record: &ApprovalRecord) -> Result<(), SentimentError> {
        approval_records::upsert_approval_record(&self.pool, record)
            .await
            .map_err(persistence)
    }

    async fn list_for_pair(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<Vec<ApprovalRecord>, SentimentError> {
        approval_records::list_approval_records_for_pair(&self.pool, keyword, subreddit)
            .await
            .map_err(persistence)
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, SentimentError> {
        subscriptions::list_subscriptions(&self.pool)
            .await
            .map_err(persistence)
    }

    async fn subscribe(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<SubscribeOutcome, SentimentError> {
        subscriptions::add_subscription(&self.pool, keyword, subreddit)
            .await
            .map_err(persistence)
    }

    async fn ping(&self) -> Result<(), SentimentError> {
        crate::health_check(&self.pool).await.map_err(persistence)
    }
}
