//! Scripted pipeline stages for route and scheduler tests.

use async_trait::async_trait;
use granthub_core::{NewGrant, RawListing, SchoolConfig};
use granthub_db::{DbError, UpsertOutcome};
use granthub_filter::{FilterError, Verdict};
use granthub_pipeline::{GrantSink, ListingSource, Pipeline, RelevanceJudge, RunSettings, SystemClock};
use granthub_search::SearchError;
use std::time::Duration;

/// Returns the same listings for every query, or fails every query.
pub struct ScriptedSource {
    listings: Option<Vec<RawListing>>,
}

impl ScriptedSource {
    pub fn returning(listings: Vec<RawListing>) -> Self {
        Self {
            listings: Some(listings),
        }
    }

    pub fn failing() -> Self {
        Self { listings: None }
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    async fn search(
        &self,
        _school: &SchoolConfig,
        _query: &str,
    ) -> Result<Vec<RawListing>, SearchError> {
        self.listings
            .clone()
            .ok_or_else(|| SearchError::UpstreamUnavailable {
                message: "serpapi returned HTTP 503".to_string(),
            })
    }
}

/// Gives the same verdict for every listing.
pub struct ScriptedJudge(pub Verdict);

#[async_trait]
impl RelevanceJudge for ScriptedJudge {
    async fn assess(
        &self,
        _listing: &RawListing,
        _school: &SchoolConfig,
    ) -> Result<Verdict, FilterError> {
        Ok(self.0.clone())
    }
}

/// Accepts every write without storing anything.
pub struct NullSink;

#[async_trait]
impl GrantSink for NullSink {
    async fn sync_schools(&self, schools: &[SchoolConfig]) -> Result<usize, DbError> {
        Ok(schools.len())
    }

    async fn upsert_grant(&self, _grant: &NewGrant) -> Result<UpsertOutcome, DbError> {
        Ok(UpsertOutcome::Stored)
    }
}

pub fn lincoln_high() -> SchoolConfig {
    SchoolConfig {
        name: "Lincoln High".to_string(),
        abbreviation: Some("LHS".to_string()),
        description: Some("Public high school with a STEM focus".to_string()),
        priority_keywords: vec!["stem".to_string()],
        exclude_keywords: vec![],
        eligibility_notes: None,
        queries: vec!["STEM grants 2025".to_string()],
        result_limit: 5,
        engine: "google".to_string(),
    }
}

pub fn listing(title: &str, link: &str) -> RawListing {
    RawListing {
        title: title.to_string(),
        snippet: format!("{title} for public schools"),
        link: link.to_string(),
        source: "grants.example.org".to_string(),
        funder: "Unknown".to_string(),
        deadline_hint: None,
        position: 1,
    }
}

pub fn settings() -> RunSettings {
    RunSettings {
        max_deadline_days: 365,
        relevance_threshold: 2,
        ai_interval: Duration::ZERO,
        rate_limit_backoff: Duration::ZERO,
    }
}

pub fn pipeline(
    source: impl ListingSource + 'static,
    judge: impl RelevanceJudge + 'static,
    sink: impl GrantSink + 'static,
) -> Pipeline {
    Pipeline::new(
        Box::new(source),
        Box::new(judge),
        Box::new(sink),
        Box::new(SystemClock),
        vec![lincoln_high()],
        settings(),
    )
}

/// A pipeline that finds nothing and touches no database.
pub fn offline_pipeline() -> Pipeline {
    pipeline(
        ScriptedSource::returning(Vec::new()),
        ScriptedJudge(Verdict::Rejected {
            reason: "not relevant".to_string(),
        }),
        NullSink,
    )
}
