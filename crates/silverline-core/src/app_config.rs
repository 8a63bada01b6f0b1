use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub classifier_url: String,
    pub classifier_language: String,
    pub http_timeout_secs: u64,
    pub fetch_limit: usize,
    pub backfill_fetch_limit: usize,
    pub subscription_cron: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("classifier_url", &self.classifier_url)
            .field("classifier_language", &self.classifier_language)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("fetch_limit", &self.fetch_limit)
            .field("backfill_fetch_limit", &self.backfill_fetch_limit)
            .field("subscription_cron", &self.subscription_cron)
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"[redacted]")
            .field("reddit_user_agent", &self.reddit_user_agent)
            .finish()
    }
}
