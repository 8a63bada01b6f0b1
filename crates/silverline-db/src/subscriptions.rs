//! Database operations for the `subscriptions` table.

use chrono::{DateTime, Utc};
use silverline_core::{SubscribeOutcome, Subscription};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub keyword: String,
    pub subreddit: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            keyword: row.keyword,
            subreddit: row.subreddit,
        }
    }
}

/// Every subscribed pair, ordered by keyword then subreddit.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_subscriptions(pool: &PgPool) -> Result<Vec<Subscription>, DbError> {
    let rows = sqlx::query_as::<_, SubscriptionRow>(
        "SELECT keyword, subreddit, created_at \
         FROM subscriptions \
         ORDER BY keyword ASC, subreddit ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Subscription::from).collect())
}

/// Add `subreddit` to `keyword`'s set and report what changed.
///
/// Runs in one transaction so the keyword check and the insert observe the
/// same snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn add_subscription(
    pool: &PgPool,
    keyword: &str,
    subreddit: &str,
) -> Result<SubscribeOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let known_keyword: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subscriptions WHERE keyword = $1)")
            .bind(keyword)
            .fetch_one(&mut *tx)
            .await?;

    let inserted = sqlx::query(
        "INSERT INTO subscriptions (keyword, subreddit) \
         VALUES ($1, $2) \
         ON CONFLICT (keyword, subreddit) DO NOTHING",
    )
    .bind(keyword)
    .bind(subreddit)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    tx.commit().await?;

    Ok(match (inserted, known_keyword) {
        (false, _) => SubscribeOutcome::AlreadySubscribed,
        (true, true) => SubscribeOutcome::AddedSubreddit,
        (true, false) => SubscribeOutcome::AddedKeyword,
    })
}
