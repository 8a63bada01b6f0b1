//! Sentiment analysis pipeline for Silverline.
//!
//! Fetches Reddit titles for a keyword, classifies them in batches of 25 via
//! an external sentiment service, aggregates the labels into an approval
//! rating with one representative example per label, and persists one
//! record per keyword, subreddit and day.

pub mod aggregate;
pub mod batch;
pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod profanity;
pub mod queue;
pub mod record;
pub mod sources;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;

pub use aggregate::{aggregate, calculate_approval_rating, Aggregation};
pub use batch::{classify_all, BATCH_SIZE};
pub use classifier::{HttpClassifier, SentimentClassifier};
pub use error::SentimentError;
pub use pipeline::{AnalysisOutcome, Analyzer, BACKFILL_DAYS};
pub use queue::{task_queue, AnalysisTask, QueueClosed, TaskQueue, TaskReceiver};
pub use record::build_record;
pub use sources::{ContentFetcher, RedditClient, RedditCredentials};
pub use store::RecordStore;
pub use types::{AnalysisSettings, BatchResult, ClassifiedItem, DayWindow, MAX_ITEM_CHARS};
