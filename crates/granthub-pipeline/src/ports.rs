//! Seams between the orchestrator and the outside world.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use granthub_core::{NewGrant, RawListing, SchoolConfig};
use granthub_db::{DbError, UpsertOutcome};
use granthub_filter::{FilterError, Verdict};
use granthub_search::SearchError;

/// Produces raw listings for one (school, query) unit.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(
        &self,
        school: &SchoolConfig,
        query: &str,
    ) -> Result<Vec<RawListing>, SearchError>;
}

/// Judges whether a listing suits a school.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Local rejection that needs no inference call. Returns the reason, or
    /// `None` when the listing must go through [`RelevanceJudge::assess`].
    fn prescreen(&self, _listing: &RawListing, _school: &SchoolConfig) -> Option<String> {
        None
    }

    async fn assess(
        &self,
        listing: &RawListing,
        school: &SchoolConfig,
    ) -> Result<Verdict, FilterError>;
}

/// Where schools and accepted grants are written.
#[async_trait]
pub trait GrantSink: Send + Sync {
    /// Make sure every configured school exists in the store. Returns the
    /// number of schools written.
    async fn sync_schools(&self, schools: &[SchoolConfig]) -> Result<usize, DbError>;

    async fn upsert_grant(&self, grant: &NewGrant) -> Result<UpsertOutcome, DbError>;

    /// Take the store-wide run lock, or `None` when another process holds
    /// it. Sinks that are not shared between processes grant it always.
    async fn try_lock_run(&self) -> Result<Option<Box<dyn RunLease>>, DbError> {
        Ok(Some(Box::new(LocalLease)))
    }
}

/// A held store-wide run lock.
#[async_trait]
pub trait RunLease: Send {
    async fn release(&mut self);
}

struct LocalLease;

#[async_trait]
impl RunLease for LocalLease {
    async fn release(&mut self) {}
}

/// Wall clock plus sleeping, injectable so timing can be tested.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
