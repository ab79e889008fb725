//! Production implementations of the pipeline ports.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use granthub_core::{NewGrant, RawListing, SchoolConfig};
use granthub_db::{DbError, PipelineRunLock, UpsertOutcome};
use granthub_filter::{FilterError, RelevanceFilter, Verdict};
use granthub_search::{SearchClient, SearchError};
use sqlx::PgPool;

use crate::ports::{Clock, GrantSink, ListingSource, RelevanceJudge, RunLease};

#[async_trait]
impl ListingSource for SearchClient {
    async fn search(
        &self,
        school: &SchoolConfig,
        query: &str,
    ) -> Result<Vec<RawListing>, SearchError> {
        self.search_with_engine(&school.engine, query, school.result_limit)
            .await
    }
}

#[async_trait]
impl RelevanceJudge for RelevanceFilter {
    fn prescreen(&self, listing: &RawListing, school: &SchoolConfig) -> Option<String> {
        match RelevanceFilter::prescreen(listing, school) {
            Some(Verdict::Rejected { reason }) => Some(reason),
            _ => None,
        }
    }

    async fn assess(
        &self,
        listing: &RawListing,
        school: &SchoolConfig,
    ) -> Result<Verdict, FilterError> {
        RelevanceFilter::assess(self, listing, school).await
    }
}

#[async_trait]
impl GrantSink for PgPool {
    async fn sync_schools(&self, schools: &[SchoolConfig]) -> Result<usize, DbError> {
        granthub_db::seed_schools(self, schools).await
    }

    async fn upsert_grant(&self, grant: &NewGrant) -> Result<UpsertOutcome, DbError> {
        granthub_db::upsert_grant(self, grant).await
    }

    async fn try_lock_run(&self) -> Result<Option<Box<dyn RunLease>>, DbError> {
        let lock = granthub_db::try_lock_pipeline_run(self).await?;
        Ok(lock.map(|lock| Box::new(lock) as Box<dyn RunLease>))
    }
}

#[async_trait]
impl RunLease for PipelineRunLock {
    async fn release(&mut self) {
        if let Err(e) = self.unlock().await {
            tracing::warn!(error = %e, "failed to release pipeline run lock; it ends with the connection");
        }
    }
}

/// The real clock: `Utc::now` and `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
