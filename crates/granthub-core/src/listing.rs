use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single search result, as handed from the search client to the filter.
///
/// Never persisted. Within a run, [`RawListing::dedup_key`] identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Display source reported by the search engine (site name or host).
    pub source: String,
    /// Best guess at the funding organization, `"Unknown"` when none matched.
    pub funder: String,
    /// Raw deadline text found in the snippet, if any.
    pub deadline_hint: Option<String>,
    /// 1-based rank within the result page.
    pub position: u32,
}

impl RawListing {
    #[must_use]
    pub fn dedup_key(&self) -> String {
        normalize_listing_url(&self.link)
    }
}

/// An accepted listing ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGrant {
    pub school_name: String,
    pub title: String,
    pub description: String,
    pub source_url: String,
    pub funder: String,
    pub deadline: Option<NaiveDate>,
    pub amount_text: Option<String>,
    pub amount_value: Option<Decimal>,
    pub eligibility: Option<String>,
    pub relevance_score: i32,
}

/// Normalize a listing URL for deduplication.
///
/// Trims whitespace, lowercases the scheme and host, drops the fragment and
/// a trailing slash on the path. Query strings are kept as-is.
#[must_use]
pub fn normalize_listing_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);

    let (head, rest) = match without_fragment.find("://") {
        Some(idx) => {
            let after_scheme = &without_fragment[idx + 3..];
            let host_end = after_scheme
                .find(['/', '?'])
                .unwrap_or(after_scheme.len());
            let head = format!(
                "{}://{}",
                without_fragment[..idx].to_ascii_lowercase(),
                after_scheme[..host_end].to_ascii_lowercase()
            );
            (head, &after_scheme[host_end..])
        }
        None => (String::new(), without_fragment),
    };

    let (path, query) = match rest.find('?') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let path = path.trim_end_matches('/');

    format!("{head}{path}{query}")
}
