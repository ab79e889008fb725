use std::time::Duration;

use chrono::Utc;
use granthub_core::{RawListing, SchoolConfig};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::keywords::keyword_score;
use crate::prompt::build_prompt;
use crate::verdict::{decide, parse_model_text, Verdict};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_THRESHOLD: i32 = 2;
const USER_AGENT: &str = concat!("granthub/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Judges listings against a school profile with a Gemini model.
///
/// Listings whose keyword score is negative are rejected locally. Every
/// other call to [`RelevanceFilter::assess`] makes exactly one
/// `generateContent` request; spacing between calls is the caller's job.
pub struct RelevanceFilter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    threshold: i32,
    debug: bool,
}

impl RelevanceFilter {
    /// Creates a filter against the production Gemini endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, FilterError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a filter against a custom base URL (used with wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, FilterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            threshold: DEFAULT_THRESHOLD,
            debug: false,
        })
    }

    /// Minimum model score for acceptance.
    #[must_use]
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Log raw model output at debug level.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Local keyword screen. Returns a rejection when the school's exclude
    /// keywords outweigh its priority keywords, `None` when the listing
    /// should go to the model.
    #[must_use]
    pub fn prescreen(listing: &RawListing, school: &SchoolConfig) -> Option<Verdict> {
        let text = format!("{} {}", listing.title, listing.snippet);
        let score = keyword_score(&text, &school.priority_keywords, &school.exclude_keywords);
        (score < 0).then(|| Verdict::Rejected {
            reason: format!("excluded by keywords (score {score})"),
        })
    }

    /// Judge one listing for one school.
    ///
    /// # Errors
    ///
    /// - [`FilterError::RateLimited`]: HTTP 429.
    /// - [`FilterError::UpstreamUnavailable`]: auth failure, 5xx or any
    ///   other non-2xx status.
    /// - [`FilterError::Http`]: network or TLS failure.
    /// - [`FilterError::MalformedResponse`]: no candidate text, a blocked
    ///   prompt, or text that is not the requested JSON object.
    pub async fn assess(
        &self,
        listing: &RawListing,
        school: &SchoolConfig,
    ) -> Result<Verdict, FilterError> {
        if let Some(rejection) = Self::prescreen(listing, school) {
            tracing::debug!(title = %listing.title, school = %school.name, "rejected by keyword pre-screen");
            return Ok(rejection);
        }

        let prompt = build_prompt(listing, school, Utc::now().date_naive());
        let text = self.generate(&prompt).await?;

        if self.debug {
            tracing::debug!(title = %listing.title, raw = %text, "model output");
        }

        let assessment = parse_model_text(&text)?;
        Ok(decide(&assessment, listing, self.threshold))
    }

    async fn generate(&self, prompt: &str) -> Result<String, FilterError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(FilterError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(FilterError::UpstreamUnavailable {
                message: format!("unexpected HTTP status {} from {}", status.as_u16(), self.model),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            FilterError::MalformedResponse(format!("generateContent body: {e}"))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(FilterError::MalformedResponse(format!(
                "prompt blocked: {reason}"
            )));
        }

        parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| FilterError::MalformedResponse("no candidate text".to_string()))
    }
}
