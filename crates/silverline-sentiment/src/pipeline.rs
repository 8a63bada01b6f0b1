//! Analysis orchestration.
//!
//! The "today" path runs check-existing, fetch, classify, aggregate, build,
//! persist and fan-out in that order; the backfill path skips the existence
//! check and the fan-out and always overwrites.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use silverline_core::{normalize_subreddit, record_id, ApprovalRecord, SubscribeOutcome};

use crate::aggregate::aggregate;
use crate::batch::classify_all;
use crate::classifier::SentimentClassifier;
use crate::error::SentimentError;
use crate::queue::{AnalysisTask, TaskQueue};
use crate::record::build_record;
use crate::sources::ContentFetcher;
use crate::store::RecordStore;
use crate::types::{truncate_chars, AnalysisSettings, DayWindow, MAX_ITEM_CHARS};

/// Trailing days queued for backfill after a fresh "today" computation.
pub const BACKFILL_DAYS: u32 = 8;

/// What [`Analyzer::analyze_today`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// A record for today already existed; nothing was recomputed.
    Existing(ApprovalRecord),
    /// The record was computed and persisted by this call.
    Computed(ApprovalRecord),
}

impl AnalysisOutcome {
    #[must_use]
    pub fn record(&self) -> &ApprovalRecord {
        match self {
            AnalysisOutcome::Existing(record) | AnalysisOutcome::Computed(record) => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> ApprovalRecord {
        match self {
            AnalysisOutcome::Existing(record) | AnalysisOutcome::Computed(record) => record,
        }
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, AnalysisOutcome::Computed(_))
    }
}

/// Runs analyses against injected collaborators.
pub struct Analyzer {
    fetcher: Arc<dyn ContentFetcher>,
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn RecordStore>,
    queue: TaskQueue,
    settings: AnalysisSettings,
}

impl Analyzer {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<dyn RecordStore>,
        queue: TaskQueue,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            store,
            queue,
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Return today's record for the pair, computing it on first request.
    ///
    /// A fresh computation queues [`BACKFILL_DAYS`] backfill tasks. Queue
    /// failures are swallowed: the caller still gets today's record.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Validation`] for a blank keyword, or the
    /// first fetch, classification or persistence error encountered.
    pub async fn analyze_today(
        &self,
        keyword: &str,
        subreddit: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, SentimentError> {
        let keyword = require_keyword(keyword)?;
        let subreddit = normalize_subreddit(subreddit);
        let today = now.date_naive();
        let id = record_id(&keyword, &subreddit, today);

        if let Some(existing) = self.store.get(&id).await? {
            tracing::debug!(id = %id, "record already exists for today");
            return Ok(AnalysisOutcome::Existing(existing));
        }

        let texts = self
            .fetch_texts(&keyword, &subreddit, None, self.settings.fetch_limit)
            .await?;
        let record = self.compute(&keyword, &subreddit, today, &texts).await?;

        if !self.store.insert(&record).await? {
            // Another invocation won the race for today's id.
            let stored = self.store.get(&id).await?.ok_or_else(|| {
                SentimentError::Persistence(format!("record {id} vanished after conflict"))
            })?;
            return Ok(AnalysisOutcome::Existing(stored));
        }

        tracing::info!(
            id = %record.id,
            approval_rating = record.approval_rating,
            items = texts.len(),
            "computed approval record"
        );

        self.fan_out_backfill(&keyword, &subreddit);
        Ok(AnalysisOutcome::Computed(record))
    }

    /// Recompute and overwrite the record `days_ago` days before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Validation`] for a blank keyword or a
    /// `days_ago` outside `1..=BACKFILL_DAYS`, or the first fetch,
    /// classification or persistence error encountered.
    pub async fn analyze_backfill_day(
        &self,
        keyword: &str,
        subreddit: &str,
        days_ago: u32,
        now: DateTime<Utc>,
    ) -> Result<ApprovalRecord, SentimentError> {
        let keyword = require_keyword(keyword)?;
        let subreddit = normalize_subreddit(subreddit);
        if !(1..=BACKFILL_DAYS).contains(&days_ago) {
            return Err(SentimentError::Validation(format!(
                "date must be between 1 and {BACKFILL_DAYS}, got {days_ago}"
            )));
        }

        let window = DayWindow::days_ago(now, days_ago);
        let texts = self
            .fetch_texts(
                &keyword,
                &subreddit,
                Some(window),
                self.settings.backfill_fetch_limit,
            )
            .await?;

        let date = now.date_naive() - Duration::days(i64::from(days_ago));
        let record = self.compute(&keyword, &subreddit, date, &texts).await?;
        self.store.upsert(&record).await?;

        tracing::info!(
            id = %record.id,
            days_ago,
            approval_rating = record.approval_rating,
            items = texts.len(),
            "backfilled approval record"
        );

        Ok(record)
    }

    /// All stored records for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Validation`] for a blank keyword or
    /// [`SentimentError::Persistence`] if the store fails.
    pub async fn get_results(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<Vec<ApprovalRecord>, SentimentError> {
        let keyword = require_keyword(keyword)?;
        let subreddit = normalize_subreddit(subreddit);
        self.store.list_for_pair(&keyword, &subreddit).await
    }

    /// Today's record for every subscribed pair. Pairs without a record for
    /// today are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Persistence`] if the store fails.
    pub async fn get_subscribed(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ApprovalRecord>, SentimentError> {
        let today = now.date_naive();
        let mut records = Vec::new();

        for subscription in self.store.list_subscriptions().await? {
            let id = record_id(&subscription.keyword, &subscription.subreddit, today);
            match self.store.get(&id).await? {
                Some(record) => records.push(record),
                None => tracing::debug!(id = %id, "no record yet for subscribed pair"),
            }
        }

        Ok(records)
    }

    /// Add `subreddit` to `keyword`'s subscription set.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Validation`] for a blank keyword or
    /// [`SentimentError::Persistence`] if the store fails.
    pub async fn subscribe(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<SubscribeOutcome, SentimentError> {
        let keyword = require_keyword(keyword)?;
        let subreddit = normalize_subreddit(subreddit);
        let outcome = self.store.subscribe(&keyword, &subreddit).await?;
        tracing::info!(keyword = %keyword, subreddit = %subreddit, outcome = ?outcome, "subscribe");
        Ok(outcome)
    }

    /// Queue a "today" analysis for every subscribed pair and return how
    /// many were queued. Results are not awaited.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Persistence`] if subscriptions cannot be read.
    pub async fn invoke_subscribed_analysis(&self) -> Result<usize, SentimentError> {
        let subscriptions = self.store.list_subscriptions().await?;
        let mut queued = 0;

        for subscription in subscriptions {
            let task = AnalysisTask::Today {
                keyword: subscription.keyword,
                subreddit: subscription.subreddit,
            };
            match self.queue.enqueue(task) {
                Ok(()) => queued += 1,
                Err(e) => tracing::debug!(error = %e, "dropped subscribed analysis task"),
            }
        }

        tracing::info!(queued, "queued subscribed analyses");
        Ok(queued)
    }

    /// Execute one queued task.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying analysis.
    pub async fn run_task(
        &self,
        task: AnalysisTask,
        now: DateTime<Utc>,
    ) -> Result<ApprovalRecord, SentimentError> {
        match task {
            AnalysisTask::Today { keyword, subreddit } => self
                .analyze_today(&keyword, &subreddit, now)
                .await
                .map(AnalysisOutcome::into_record),
            AnalysisTask::Backfill {
                keyword,
                subreddit,
                days_ago,
            } => {
                self.analyze_backfill_day(&keyword, &subreddit, days_ago, now)
                    .await
            }
        }
    }

    async fn fetch_texts(
        &self,
        keyword: &str,
        subreddit: &str,
        window: Option<DayWindow>,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError> {
        let texts = self.fetcher.fetch(keyword, subreddit, window, limit).await?;
        Ok(texts
            .iter()
            .map(|text| truncate_chars(text, MAX_ITEM_CHARS))
            .collect())
    }

    async fn compute(
        &self,
        keyword: &str,
        subreddit: &str,
        date: NaiveDate,
        texts: &[String],
    ) -> Result<ApprovalRecord, SentimentError> {
        let items = classify_all(self.classifier.as_ref(), texts).await?;
        let aggregation = aggregate(&items);
        Ok(build_record(keyword, subreddit, date, &aggregation))
    }

    fn fan_out_backfill(&self, keyword: &str, subreddit: &str) {
        for days_ago in 1..=BACKFILL_DAYS {
            let task = AnalysisTask::Backfill {
                keyword: keyword.to_string(),
                subreddit: subreddit.to_string(),
                days_ago,
            };
            if let Err(e) = self.queue.enqueue(task) {
                tracing::debug!(error = %e, days_ago, "dropped backfill task");
            }
        }
    }
}

fn require_keyword(raw: &str) -> Result<String, SentimentError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(SentimentError::Validation("keyword is required".to_string()));
    }
    Ok(keyword.to_string())
}
