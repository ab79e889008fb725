//! Conversion from raw SerpAPI results to [`granthub_core::RawListing`].

use std::sync::LazyLock;

use granthub_core::{find_deadline_text, RawListing};
use regex::Regex;

use crate::types::OrganicResult;

const UNKNOWN_FUNDER: &str = "Unknown";
const MISSING_TITLE: &str = "No title available";

/// A run of capitalized words ending in an organization noun, e.g.
/// "National Science Foundation" or "Department of Education Program".
static FUNDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b([A-Z][a-zA-Z&'-]+(?:\s+(?:of|for|and|&|the|in))?\s*",
        r"[A-Z][a-zA-Z&'-]*(?:\s+[A-Z][a-zA-Z&'-]+)*\s+",
        r"(?:Foundation|Institutes?|Agency|Department|Council|Society|",
        r"Association|Charity|Trust|Fund|Endowment|Initiative|Center|Centre|",
        r"University|Program|Commission|Network|Organization))\b",
    ))
    .expect("valid funder regex")
});

/// Extract the funding organization from a result.
///
/// The snippet is searched first, then the title. Falls back to the result's
/// `source`, then `"Unknown"`.
#[must_use]
pub fn extract_funder(title: &str, snippet: &str, source: &str) -> String {
    for text in [snippet, title] {
        if let Some(caps) = FUNDER.captures(text) {
            if let Some(m) = caps.get(1) {
                return m.as_str().trim().to_string();
            }
        }
    }

    let source = source.trim();
    if source.is_empty() {
        UNKNOWN_FUNDER.to_string()
    } else {
        source.to_string()
    }
}

/// Convert one organic result into a listing.
///
/// Returns `None` for results without a link, since the link is the
/// listing's identity. `fallback_position` is used when SerpAPI omits
/// `position`.
#[must_use]
pub fn to_listing(result: &OrganicResult, fallback_position: u32) -> Option<RawListing> {
    let link = result.link.as_deref().map(str::trim).filter(|l| !l.is_empty())?;

    let title = result
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(MISSING_TITLE);
    let snippet = result.snippet.as_deref().map_or("", str::trim);
    let source_name = result.source.as_deref().unwrap_or("");

    let display_source = result
        .displayed_link
        .as_deref()
        .or(result.source.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| host_of(link).to_string(), ToOwned::to_owned);

    Some(RawListing {
        title: title.to_string(),
        snippet: snippet.to_string(),
        link: link.to_string(),
        source: display_source,
        funder: extract_funder(title, snippet, source_name),
        deadline_hint: find_deadline_text(snippet),
        position: result.position.unwrap_or(fallback_position),
    })
}

fn host_of(link: &str) -> &str {
    let after_scheme = link.split_once("://").map_or(link, |(_, rest)| rest);
    after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
