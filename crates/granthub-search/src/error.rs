use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("rate limited by search upstream (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response cache error at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    /// Network, TLS, auth and server-side failures: the upstream could not
    /// answer this query.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UpstreamUnavailable { .. })
    }
}
