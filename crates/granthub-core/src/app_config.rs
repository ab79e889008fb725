use std::net::SocketAddr;
use std::path::PathBuf;

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

/// Process-wide settings, built once at startup and handed to every
/// component constructor.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub debug: bool,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub api_keys: Vec<String>,
    pub schools_path: PathBuf,
    pub serp_api_key: Option<String>,
    pub serpapi_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub http_timeout_secs: u64,
    pub search_cache_dir: PathBuf,
    pub search_cache_ttl_hours: u64,
    /// Listings whose deadline lies further ahead than this are dropped.
    pub max_deadline_days: u32,
    /// Minimum model score for a listing to be accepted.
    pub relevance_threshold: i32,
    /// Minimum spacing between two inference calls.
    pub ai_rate_limit_secs: u64,
    pub rate_limit_backoff_secs: u64,
    pub pipeline_cron: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Returns `true` when any configured origin is the `*` wildcard.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("allowed_origins", &self.allowed_origins)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("schools_path", &self.schools_path)
            .field("database_url", &"[redacted]")
            .field(
                "serp_api_key",
                &self.serp_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("search_cache_dir", &self.search_cache_dir)
            .field("search_cache_ttl_hours", &self.search_cache_ttl_hours)
            .field("max_deadline_days", &self.max_deadline_days)
            .field("relevance_threshold", &self.relevance_threshold)
            .field("ai_rate_limit_secs", &self.ai_rate_limit_secs)
            .field("rate_limit_backoff_secs", &self.rate_limit_backoff_secs)
            .field("pipeline_cron", &self.pipeline_cron)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
