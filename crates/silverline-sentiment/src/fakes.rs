//! In-memory collaborators for tests.
//!
//! Compiled for this crate's own tests and, behind the `test-util` feature,
//! for downstream crates that drive an [`Analyzer`](crate::Analyzer) without
//! network or database access.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use silverline_core::{ApprovalRecord, LabelMap, SentimentLabel, SubscribeOutcome, Subscription};

use crate::classifier::SentimentClassifier;
use crate::error::SentimentError;
use crate::sources::ContentFetcher;
use crate::store::RecordStore;
use crate::types::{BatchResult, DayWindow};

const DEFAULT_SCORE: f64 = 0.6;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deterministic label for a text: `good` is positive, `bad` negative,
/// `meh` mixed, anything else neutral.
#[must_use]
pub fn label_for(text: &str) -> SentimentLabel {
    let lower = text.to_lowercase();
    if lower.contains("good") {
        SentimentLabel::Positive
    } else if lower.contains("bad") {
        SentimentLabel::Negative
    } else if lower.contains("meh") {
        SentimentLabel::Mixed
    } else {
        SentimentLabel::Neutral
    }
}

/// Classifier that labels by [`label_for`] and records every call.
#[derive(Default)]
pub struct FakeClassifier {
    reversed: bool,
    scores: HashMap<String, f64>,
    fail_on_call: Option<usize>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl FakeClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return each batch's results in reverse index order.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Score `text`'s own label with `score` instead of the default.
    #[must_use]
    pub fn with_score(mut self, text: &str, score: f64) -> Self {
        self.scores.insert(text.to_string(), score);
        self
    }

    /// Fail the `call`-th classify call (1-based).
    #[must_use]
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        lock(&self.batch_sizes).len()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        lock(&self.batch_sizes).clone()
    }
}

#[async_trait]
impl SentimentClassifier for FakeClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<BatchResult>, SentimentError> {
        let call = {
            let mut sizes = lock(&self.batch_sizes);
            sizes.push(batch.len());
            sizes.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(SentimentError::Classification(format!(
                "fake failure on call {call}"
            )));
        }

        let mut results: Vec<BatchResult> = batch
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let label = label_for(text);
                let mut confidence = LabelMap {
                    positive: 0.0,
                    negative: 0.0,
                    neutral: 0.0,
                    mixed: 0.0,
                };
                confidence[label] = self.scores.get(text).copied().unwrap_or(DEFAULT_SCORE);
                BatchResult {
                    index,
                    label,
                    confidence,
                }
            })
            .collect();
        if self.reversed {
            results.reverse();
        }
        Ok(results)
    }
}

/// Arguments of one [`FakeFetcher`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub keyword: String,
    pub subreddit: String,
    pub window: Option<DayWindow>,
    pub limit: usize,
}

/// Fetcher returning a fixed list of texts.
#[derive(Default)]
pub struct FakeFetcher {
    texts: Mutex<Vec<String>>,
    fail: bool,
    calls: Mutex<Vec<FetchCall>>,
}

impl FakeFetcher {
    #[must_use]
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            texts: Mutex::new(texts.iter().map(|t| (*t).to_string()).collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn set_texts(&self, texts: &[&str]) {
        *lock(&self.texts) = texts.iter().map(|t| (*t).to_string()).collect();
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch(
        &self,
        keyword: &str,
        subreddit: &str,
        window: Option<DayWindow>,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError> {
        lock(&self.calls).push(FetchCall {
            keyword: keyword.to_string(),
            subreddit: subreddit.to_string(),
            window,
            limit,
        });
        if self.fail {
            return Err(SentimentError::Fetch("fake fetch failure".to_string()));
        }
        Ok(lock(&self.texts).iter().take(limit).cloned().collect())
    }
}

/// Record store backed by ordered maps.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<String, ApprovalRecord>>,
    subscriptions: Mutex<BTreeSet<(String, String)>>,
    fail: bool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with a persistence error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn record_count(&self) -> usize {
        lock(&self.records).len()
    }

    fn check(&self) -> Result<(), SentimentError> {
        if self.fail {
            return Err(SentimentError::Persistence(
                "fake store failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get(&self, id: &str) -> Result<Option<ApprovalRecord>, SentimentError> {
        self.check()?;
        Ok(lock(&self.records).get(id).cloned())
    }

    async fn insert(&self, record: &ApprovalRecord) -> Result<bool, SentimentError> {
        self.check()?;
        let mut records = lock(&self.records);
        if records.contains_key(&record.id) {
            return Ok(false);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(true)
    }

    async fn upsert(&self, record: &ApprovalRecord) -> Result<(), SentimentError> {
        self.check()?;
        lock(&self.records).insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list_for_pair(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<Vec<ApprovalRecord>, SentimentError> {
        self.check()?;
        let mut records: Vec<ApprovalRecord> = lock(&self.records)
            .values()
            .filter(|r| r.keyword == keyword && r.subreddit == subreddit)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(records)
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, SentimentError> {
        self.check()?;
        Ok(lock(&self.subscriptions)
            .iter()
            .map(|(keyword, subreddit)| Subscription {
                keyword: keyword.clone(),
                subreddit: subreddit.clone(),
            })
            .collect())
    }

    async fn subscribe(
        &self,
        keyword: &str,
        subreddit: &str,
    ) -> Result<SubscribeOutcome, SentimentError> {
        self.check()?;
        let mut subscriptions = lock(&self.subscriptions);
        let known_keyword = subscriptions.iter().any(|(k, _)| k == keyword);
        if !subscriptions.insert((keyword.to_string(), subreddit.to_string())) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        Ok(if known_keyword {
            SubscribeOutcome::AddedSubreddit
        } else {
            SubscribeOutcome::AddedKeyword
        })
    }

    async fn ping(&self) -> Result<(), SentimentError> {
        self.check()
    }
}
