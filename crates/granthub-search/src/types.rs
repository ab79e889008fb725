use serde::{Deserialize, Serialize};

/// The subset of a SerpAPI `search.json` body this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpApiResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// Set by SerpAPI instead of an HTTP error for invalid keys, exhausted
    /// plans and empty result pages.
    #[serde(default)]
    pub error: Option<String>,
}

/// One organic search result. Every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub displayed_link: Option<String>,
}
