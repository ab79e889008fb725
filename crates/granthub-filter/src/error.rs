use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("rate limited by inference upstream (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The model answered, but not with the JSON object we asked for.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl FilterError {
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UpstreamUnavailable { .. })
    }
}
