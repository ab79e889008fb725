use std::time::Duration;

use granthub_core::{RawListing, DEFAULT_SEARCH_ENGINE};
use reqwest::{Client, StatusCode};

use crate::cache::ResponseCache;
use crate::error::SearchError;
use crate::normalize::to_listing;
use crate::types::{OrganicResult, SerpApiResponse};

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";
/// Restrict results to the past month.
const TIME_FILTER: &str = "qdr:m";
const USER_AGENT: &str = concat!("granthub/", env!("CARGO_PKG_VERSION"));

/// HTTP client for SerpAPI's `search.json` endpoint.
///
/// Each uncached search makes exactly one request; nothing is retried here.
/// When a [`ResponseCache`] is attached, fresh cached responses are served
/// without touching the network and every successful fetch is written back.
pub struct SearchClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Option<ResponseCache>,
}

impl SearchClient {
    /// Creates a client for the production SerpAPI endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (used with wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: None,
        })
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Search the default engine and return at most `max_results` listings.
    ///
    /// # Errors
    ///
    /// See [`Self::search_with_engine`].
    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawListing>, SearchError> {
        self.search_with_engine(DEFAULT_SEARCH_ENGINE, query, max_results)
            .await
    }

    /// Search one engine and return at most `max_results` listings, in rank
    /// order. Results without a link are dropped.
    ///
    /// # Errors
    ///
    /// - [`SearchError::RateLimited`]: HTTP 429.
    /// - [`SearchError::UpstreamUnavailable`]: auth failure, 5xx, any other
    ///   non-2xx status, or an API-level `error` other than "no results".
    /// - [`SearchError::Http`]: network or TLS failure.
    /// - [`SearchError::Deserialize`]: the body is not the expected JSON.
    pub async fn search_with_engine(
        &self,
        engine: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawListing>, SearchError> {
        let results = self.organic_results(engine, query, max_results).await?;

        let limit = usize::try_from(max_results).unwrap_or(usize::MAX);
        let listings = results
            .iter()
            .zip(1u32..)
            .filter_map(|(result, rank)| to_listing(result, rank))
            .take(limit)
            .collect();

        Ok(listings)
    }

    async fn organic_results(
        &self,
        engine: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<OrganicResult>, SearchError> {
        let key = ResponseCache::key(engine, query, max_results);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(results)) => {
                    tracing::debug!(engine, query, "search cache hit");
                    return Ok(results);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "search cache read failed; fetching"),
            }
        }

        let results = self.fetch(engine, query, max_results).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, engine, query, &results).await {
                tracing::warn!(error = %e, "search cache write failed");
            }
        }

        Ok(results)
    }

    async fn fetch(
        &self,
        engine: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<OrganicResult>, SearchError> {
        let url = format!("{}/search.json", self.base_url);
        let num = max_results.to_string();

        tracing::debug!(engine, query, max_results, "querying SerpAPI");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", engine),
                ("q", query),
                ("tbs", TIME_FILTER),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(SearchError::RateLimited { retry_after_secs });
        }

        let body = response.text().await?;

        if !status.is_success() {
            // SerpAPI reports auth and quota failures with a JSON `error` body.
            let detail = serde_json::from_str::<SerpApiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("unexpected HTTP status {}", status.as_u16()));
            return Err(SearchError::UpstreamUnavailable {
                message: format!("{} ({detail})", status.as_u16()),
            });
        }

        let parsed =
            serde_json::from_str::<SerpApiResponse>(&body).map_err(|e| SearchError::Deserialize {
                context: format!("SerpAPI response for query '{query}'"),
                source: e,
            })?;

        if let Some(error) = parsed.error {
            if is_empty_result_error(&error) {
                tracing::info!(query, "search returned no results");
                return Ok(Vec::new());
            }
            return Err(SearchError::UpstreamUnavailable { message: error });
        }

        Ok(parsed.organic_results)
    }
}

/// SerpAPI signals an empty result page through `error` rather than an empty list.
fn is_empty_result_error(message: &str) -> bool {
    message.to_lowercase().contains("hasn't returned any results")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_error_is_recognized() {
        assert!(is_empty_result_error(
            "Google hasn't returned any results for this query."
        ));
        assert!(!is_empty_result_error("Invalid API key."));
    }
}
