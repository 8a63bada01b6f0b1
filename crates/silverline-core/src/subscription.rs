use serde::{Deserialize, Serialize};

/// A keyword subscribed for recurring analysis in one subreddit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub keyword: String,
    pub subreddit: String,
}

/// Result of adding a subreddit to a keyword's subscription set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// The keyword had no subscriptions before.
    AddedKeyword,
    /// The keyword existed; the subreddit is new to its set.
    AddedSubreddit,
    /// Nothing changed.
    AlreadySubscribed,
}

impl SubscribeOutcome {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            SubscribeOutcome::AddedKeyword => "Added New Entry to Database",
            SubscribeOutcome::AddedSubreddit => "Subreddit has been added to the subscribed list",
            SubscribeOutcome::AlreadySubscribed => "Subreddit is already subscribed to",
        }
    }
}
