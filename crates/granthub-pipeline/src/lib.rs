//! The scrape -> filter -> store pipeline.
//!
//! [`Pipeline::run`] walks every configured (school, search query) unit,
//! searches, judges each new listing and upserts the accepted ones. Each
//! stage sits behind a trait in [`ports`] so tests can swap in fakes.

pub mod adapters;
pub mod error;
pub mod gate;
pub mod guard;
pub mod ports;
pub mod report;
mod run;

pub use adapters::SystemClock;
pub use error::PipelineError;
pub use gate::IntervalGate;
pub use guard::{RunGuard, RunPermit};
pub use ports::{Clock, GrantSink, ListingSource, RelevanceJudge, RunLease};
pub use report::{PipelineRunReport, RunOutcome, RunTrigger};
pub use run::{Pipeline, RunSettings};
