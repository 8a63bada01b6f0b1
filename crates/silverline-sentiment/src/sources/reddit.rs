//! Reddit search collector (client-credentials OAuth).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::reddit_helpers::{created_at, in_window, search_path, to_text, MAX_PAGE_LIMIT};
use super::ContentFetcher;
use crate::error::SentimentError;
use crate::types::DayWindow;

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
/// Pages walked when filtering a listing down to one day.
const WINDOW_PAGE_COUNT: usize = 3;
/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials for the client-credentials grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Post {
    pub(super) data: PostData,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostData {
    pub(super) title: Option<String>,
    pub(super) created_utc: Option<f64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Reddit API client. Access tokens are fetched lazily and reused until
/// shortly before they expire.
pub struct RedditClient {
    client: reqwest::Client,
    credentials: RedditCredentials,
    auth_base: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl RedditClient {
    /// Create a client pointed at the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Fetch`] if the HTTP client cannot be built.
    pub fn new(credentials: RedditCredentials, timeout_secs: u64) -> Result<Self, SentimentError> {
        Self::with_base_urls(credentials, timeout_secs, DEFAULT_AUTH_BASE, DEFAULT_API_BASE)
    }

    /// Create a client with custom token and API base URLs (for wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Fetch`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        credentials: RedditCredentials,
        timeout_secs: u64,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, SentimentError> {
        // oauth.reddit.com sometimes blocks rustls via TLS fingerprinting.
        // If rejected, enable `native-tls` on reqwest and call `.use_native_tls()`.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SentimentError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            auth_base: auth_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, SentimentError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in.unwrap_or(3600))
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = fresh.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, SentimentError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .header("User-Agent", &self.credentials.user_agent)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SentimentError::Fetch(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Fetch(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SentimentError::Fetch(format!("token parse error: {e}")))
    }

    async fn search_page(
        &self,
        keyword: &str,
        subreddit: &str,
        sort: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<ListingData, SentimentError> {
        let token = self.access_token().await?;

        let mut params: Vec<(&str, String)> = vec![
            ("q", keyword.to_string()),
            ("restrict_sr", "true".to_string()),
            ("sort", sort.to_string()),
            ("limit", limit.min(MAX_PAGE_LIMIT).to_string()),
            ("type", "link".to_string()),
        ];
        if let Some(cursor) = after {
            params.push(("after", cursor.to_string()));
        }

        let response = self
            .client
            .get(format!("{}{}", self.api_base, search_path(subreddit)))
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", &self.credentials.user_agent)
            .query(&params)
            .send()
            .await
            .map_err(|e| SentimentError::Fetch(format!("Reddit search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Fetch(format!(
                "Reddit search failed with status {}",
                response.status()
            )));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| SentimentError::Fetch(format!("Reddit response parse error: {e}")))?;

        Ok(listing.data)
    }

    /// One page of hot posts for the keyword.
    async fn search_hot(
        &self,
        keyword: &str,
        subreddit: &str,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError> {
        let page = self
            .search_page(keyword, subreddit, "hot", limit, None)
            .await?;
        Ok(page.children.iter().filter_map(to_text).take(limit).collect())
    }

    /// Newest posts, walked page by page, keeping those inside `window`.
    async fn search_window(
        &self,
        keyword: &str,
        subreddit: &str,
        window: &DayWindow,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError> {
        let mut texts = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..WINDOW_PAGE_COUNT {
            let page = self
                .search_page(keyword, subreddit, "new", MAX_PAGE_LIMIT, after.as_deref())
                .await?;

            let mut passed_window = false;
            for post in &page.children {
                if in_window(post, window) {
                    if let Some(text) = to_text(post) {
                        texts.push(text);
                    }
                } else if created_at(post).is_some_and(|at| at < window.after) {
                    passed_window = true;
                }
                if texts.len() >= limit {
                    return Ok(texts);
                }
            }

            after = page.after;
            if passed_window || after.is_none() {
                break;
            }
        }

        Ok(texts)
    }
}

#[async_trait]
impl ContentFetcher for RedditClient {
    async fn fetch(
        &self,
        keyword: &str,
        subreddit: &str,
        window: Option<DayWindow>,
        limit: usize,
    ) -> Result<Vec<String>, SentimentError> {
        let texts = match window {
            None => self.search_hot(keyword, subreddit, limit).await?,
            Some(window) => {
                self.search_window(keyword, subreddit, &window, limit)
                    .await?
            }
        };

        tracing::debug!(
            keyword,
            subreddit,
            windowed = window.is_some(),
            count = texts.len(),
            "collected Reddit texts"
        );

        Ok(texts)
    }
}
