use std::collections::HashSet;
use std::time::Duration;

use granthub_core::{AppConfig, DeadlineWindow, NewGrant, RawListing, SchoolConfig};
use granthub_db::UpsertOutcome;
use granthub_filter::{ExtractedFields, FilterError, RelevanceFilter, Verdict};
use granthub_search::{ResponseCache, SearchClient, SearchError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::SystemClock;
use crate::error::PipelineError;
use crate::gate::IntervalGate;
use crate::guard::RunGuard;
use crate::ports::{Clock, GrantSink, ListingSource, RelevanceJudge};
use crate::report::{PipelineRunReport, RunTrigger};

/// Tunables for one pipeline, taken from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub max_deadline_days: u32,
    pub relevance_threshold: i32,
    /// Minimum spacing between AI calls.
    pub ai_interval: Duration,
    /// Longest pause after an upstream 429.
    pub rate_limit_backoff: Duration,
}

impl RunSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_deadline_days: config.max_deadline_days,
            relevance_threshold: config.relevance_threshold,
            ai_interval: Duration::from_secs(config.ai_rate_limit_secs),
            rate_limit_backoff: Duration::from_secs(config.rate_limit_backoff_secs),
        }
    }

    /// Pause after a 429: the upstream's `Retry-After` when it sent one,
    /// capped at the configured backoff.
    fn backoff(&self, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs.map_or(self.rate_limit_backoff, |secs| {
            Duration::from_secs(secs).min(self.rate_limit_backoff)
        })
    }
}

/// The scrape -> filter -> store orchestrator.
pub struct Pipeline {
    source: Box<dyn ListingSource>,
    judge: Box<dyn RelevanceJudge>,
    sink: Box<dyn GrantSink>,
    clock: Box<dyn Clock>,
    schools: Vec<SchoolConfig>,
    settings: RunSettings,
    guard: RunGuard,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("schools", &self.schools.len())
            .field("settings", &self.settings)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

/// What happened to one listing after dedup.
enum ListingFate {
    Rejected,
    OutOfWindow,
    Written(UpsertOutcome),
    /// Accepted, but the write failed.
    StoreFailed,
    Errored,
    /// Rate limited; stop the current unit.
    Throttled(Option<u64>),
}

impl Pipeline {
    #[must_use]
    pub fn new(
        source: Box<dyn ListingSource>,
        judge: Box<dyn RelevanceJudge>,
        sink: Box<dyn GrantSink>,
        clock: Box<dyn Clock>,
        schools: Vec<SchoolConfig>,
        settings: RunSettings,
    ) -> Self {
        Self {
            source,
            judge,
            sink,
            clock,
            schools,
            settings,
            guard: RunGuard::new(),
        }
    }

    /// Build the production pipeline: SerpAPI with the on-disk cache, Gemini,
    /// and the Postgres pool.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingApiKey`] when either provider key is
    /// unset, [`PipelineError::Config`] when the school profiles cannot be
    /// loaded, and a client error when an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<Self, PipelineError> {
        let serp_key = config
            .serp_api_key
            .as_deref()
            .ok_or(PipelineError::MissingApiKey("SERP_API_KEY"))?;
        let gemini_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(PipelineError::MissingApiKey("GEMINI_API_KEY"))?;

        let schools = granthub_core::load_schools(&config.schools_path)?.schools;

        let cache = ResponseCache::new(config.search_cache_dir.clone(), config.search_cache_ttl_hours);
        let search = SearchClient::with_base_url(
            serp_key,
            config.http_timeout_secs,
            &config.serpapi_base_url,
        )?
        .with_cache(cache);

        let filter = RelevanceFilter::with_base_url(
            gemini_key,
            &config.gemini_model,
            config.http_timeout_secs,
            &config.gemini_base_url,
        )?
        .with_threshold(config.relevance_threshold)
        .with_debug(config.debug);

        Ok(Self::new(
            Box::new(search),
            Box::new(filter),
            Box::new(pool),
            Box::new(SystemClock),
            schools,
            RunSettings::from_app_config(config),
        ))
    }

    /// Share an existing guard, so that several pipelines or other triggers
    /// exclude each other.
    #[must_use]
    pub fn with_guard(mut self, guard: RunGuard) -> Self {
        self.guard = guard;
        self
    }

    #[must_use]
    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    #[must_use]
    pub fn schools(&self) -> &[SchoolConfig] {
        &self.schools
    }

    /// Execute one full run across every configured unit.
    ///
    /// Per-unit and per-listing failures never abort the run; they are
    /// counted in `errored`. Inspect [`PipelineRunReport::outcome`] for the
    /// overall result.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyRunning`] when another run holds the
    /// in-process guard or, in any process, the store-wide run lock, and
    /// [`PipelineError::RunLock`] when the store lock cannot be queried.
    pub async fn run(&self, trigger: RunTrigger) -> Result<PipelineRunReport, PipelineError> {
        let _permit = self
            .guard
            .try_acquire()
            .ok_or(PipelineError::AlreadyRunning)?;
        let mut lease = self
            .sink
            .try_lock_run()
            .await
            .map_err(PipelineError::RunLock)?
            .ok_or(PipelineError::AlreadyRunning)?;

        let started_at = self.clock.now();
        let mut report = PipelineRunReport::new(Uuid::new_v4(), trigger, started_at);
        tracing::info!(
            run_id = %report.run_id,
            %trigger,
            schools = self.schools.len(),
            "pipeline run started"
        );

        match self.sink.sync_schools(&self.schools).await {
            Ok(count) => tracing::debug!(count, "schools synced"),
            Err(e) => {
                tracing::error!(error = %e, "failed to sync schools; continuing");
                report.errored += 1;
            }
        }

        let window = DeadlineWindow::new(started_at.date_naive(), self.settings.max_deadline_days);
        let mut gate = IntervalGate::new(self.settings.ai_interval);

        for school in &self.schools {
            let mut seen = HashSet::new();
            for query in school.queries.iter().map(|q| q.trim()).filter(|q| !q.is_empty()) {
                report.units += 1;
                self.run_unit(school, query, window, &mut seen, &mut gate, &mut report)
                    .await;
            }
        }

        report.finished_at = Some(self.clock.now());
        tracing::info!(
            run_id = %report.run_id,
            outcome = %report.outcome(),
            units = report.units,
            scraped = report.scraped,
            accepted = report.accepted,
            rejected = report.rejected,
            stored = report.stored,
            updated = report.updated,
            errored = report.errored,
            "pipeline run finished"
        );

        lease.release().await;
        Ok(report)
    }

    async fn run_unit(
        &self,
        school: &SchoolConfig,
        query: &str,
        window: DeadlineWindow,
        seen: &mut HashSet<String>,
        gate: &mut IntervalGate,
        report: &mut PipelineRunReport,
    ) {
        let listings = match self.source.search(school, query).await {
            Ok(listings) => listings,
            Err(SearchError::RateLimited { retry_after_secs }) => {
                tracing::warn!(school = %school.name, query, "search rate limited; skipping unit");
                report.errored += 1;
                self.clock.sleep(self.settings.backoff(retry_after_secs)).await;
                return;
            }
            Err(e) => {
                tracing::warn!(school = %school.name, query, error = %e, "search failed; skipping unit");
                report.errored += 1;
                return;
            }
        };

        tracing::debug!(school = %school.name, query, count = listings.len(), "search returned");
        report.scraped += listings.len();

        for listing in &listings {
            if !seen.insert(listing.dedup_key()) {
                report.duplicates += 1;
                continue;
            }

            if let Some(reason) = self.judge.prescreen(listing, school) {
                tracing::debug!(title = %listing.title, %reason, "listing rejected before inference");
                report.rejected += 1;
                continue;
            }

            gate.wait(self.clock.as_ref()).await;

            match self.process_listing(school, listing, window).await {
                ListingFate::Rejected => report.rejected += 1,
                ListingFate::OutOfWindow => {
                    report.accepted += 1;
                    report.out_of_window += 1;
                }
                ListingFate::Written(UpsertOutcome::Stored) => {
                    report.accepted += 1;
                    report.stored += 1;
                }
                ListingFate::Written(UpsertOutcome::Updated) => {
                    report.accepted += 1;
                    report.updated += 1;
                }
                ListingFate::StoreFailed => {
                    report.accepted += 1;
                    report.errored += 1;
                }
                ListingFate::Errored => report.errored += 1,
                ListingFate::Throttled(retry_after_secs) => {
                    report.errored += 1;
                    self.clock.sleep(self.settings.backoff(retry_after_secs)).await;
                    return;
                }
            }
        }
    }

    async fn process_listing(
        &self,
        school: &SchoolConfig,
        listing: &RawListing,
        window: DeadlineWindow,
    ) -> ListingFate {
        let verdict = match self.judge.assess(listing, school).await {
            Ok(verdict) => verdict,
            Err(FilterError::MalformedResponse(message)) => {
                tracing::warn!(title = %listing.title, %message, "malformed model response; treating as rejected");
                return ListingFate::Rejected;
            }
            Err(FilterError::RateLimited { retry_after_secs }) => {
                tracing::warn!(school = %school.name, "model rate limited; skipping rest of unit");
                return ListingFate::Throttled(retry_after_secs);
            }
            Err(e) => {
                tracing::warn!(title = %listing.title, error = %e, "relevance check failed");
                return ListingFate::Errored;
            }
        };

        let (fields, score) = match verdict {
            Verdict::Accepted { fields, score } => (fields, score),
            Verdict::Rejected { reason } => {
                tracing::debug!(title = %listing.title, %reason, "listing rejected");
                return ListingFate::Rejected;
            }
        };

        if score < self.settings.relevance_threshold {
            tracing::debug!(title = %listing.title, score, "score below threshold");
            return ListingFate::Rejected;
        }

        if !window.admits(fields.deadline) {
            tracing::debug!(title = %listing.title, deadline = ?fields.deadline, "deadline outside window");
            return ListingFate::OutOfWindow;
        }

        let grant = to_new_grant(school, listing, fields, score);
        match self.sink.upsert_grant(&grant).await {
            Ok(outcome) => ListingFate::Written(outcome),
            Err(e) => {
                tracing::error!(title = %grant.title, error = %e, "failed to store grant");
                ListingFate::StoreFailed
            }
        }
    }
}

fn to_new_grant(
    school: &SchoolConfig,
    listing: &RawListing,
    fields: ExtractedFields,
    score: i32,
) -> NewGrant {
    NewGrant {
        school_name: school.name.clone(),
        title: listing.title.clone(),
        description: listing.snippet.clone(),
        source_url: listing.dedup_key(),
        funder: fields.funder.unwrap_or_else(|| listing.funder.clone()),
        deadline: fields.deadline.date(),
        amount_text: fields.amount_text,
        amount_value: fields.amount_value,
        eligibility: fields.eligibility,
        relevance_score: score,
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
