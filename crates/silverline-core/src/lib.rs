mod app_config;
mod config;
pub mod record;
pub mod sentiment;
pub mod subscription;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{
    format_record_date, normalize_subreddit, record_id, ApprovalRecord, ALL_SUBREDDITS,
};
pub use sentiment::{
    LabelMap, ParseLabelError, SentimentConfidences, SentimentCounts, SentimentExamples,
    SentimentLabel,
};
pub use subscription::{SubscribeOutcome, Subscription};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
