use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunTrigger {
    Scheduled,
    Manual,
}

impl std::fmt::Display for RunTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunTrigger::Scheduled => write!(f, "scheduled"),
            RunTrigger::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Succeeded,
    Partial,
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Succeeded => write!(f, "succeeded"),
            RunOutcome::Partial => write!(f, "partial"),
            RunOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Counters and timestamps for one run. Returned to the caller and logged,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRunReport {
    pub run_id: Uuid,
    pub trigger: RunTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// (school, query) pairs attempted.
    pub units: usize,
    /// Listings returned by search, duplicates included.
    pub scraped: usize,
    /// Listings skipped because their URL was already seen for the school.
    pub duplicates: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Accepted listings dropped by the deadline window.
    pub out_of_window: usize,
    pub stored: usize,
    pub updated: usize,
    pub errored: usize,
}

impl PipelineRunReport {
    #[must_use]
    pub fn new(run_id: Uuid, trigger: RunTrigger, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            trigger,
            started_at,
            finished_at: None,
            units: 0,
            scraped: 0,
            duplicates: 0,
            accepted: 0,
            rejected: 0,
            out_of_window: 0,
            stored: 0,
            updated: 0,
            errored: 0,
        }
    }

    /// Grants written this run, new or refreshed.
    #[must_use]
    pub fn persisted(&self) -> usize {
        self.stored + self.updated
    }

    /// `Failed` when errors occurred and nothing was written, `Partial` when
    /// errors occurred alongside writes, `Succeeded` otherwise.
    #[must_use]
    pub fn outcome(&self) -> RunOutcome {
        match (self.errored, self.persisted()) {
            (0, _) => RunOutcome::Succeeded,
            (_, 0) => RunOutcome::Failed,
            _ => RunOutcome::Partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn report() -> PipelineRunReport {
        PipelineRunReport::new(
            Uuid::nil(),
            RunTrigger::Manual,
            Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap(),
        )
    }

    #[test]
    fn clean_run_succeeds_even_when_empty() {
        assert_eq!(report().outcome(), RunOutcome::Succeeded);
    }

    #[test]
    fn errors_without_writes_fail() {
        let mut r = report();
        r.errored = 2;
        assert_eq!(r.outcome(), RunOutcome::Failed);
    }

    #[test]
    fn errors_with_writes_are_partial() {
        let mut r = report();
        r.errored = 1;
        r.updated = 1;
        assert_eq!(r.outcome(), RunOutcome::Partial);
    }

    #[test]
    fn serializes_lowercase_enums() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["trigger"], "manual");
        assert_eq!(json["finished_at"], serde_json::Value::Null);
        assert_eq!(
            serde_json::to_value(RunOutcome::Partial).unwrap(),
            "partial"
        );
    }
}
