//! Background job scheduler.
//!
//! Registers the weekly pipeline run. Manual runs through `POST /api/refresh`
//! share the pipeline's run guard, so a scheduled tick that lands during a
//! manual run is skipped.

use std::sync::Arc;

use granthub_pipeline::{Pipeline, PipelineError, PipelineRunReport, RunTrigger};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
/// Without a pipeline no job is registered.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised or
/// started, or if `cron` does not parse.
pub async fn build_scheduler(
    pipeline: Option<Arc<Pipeline>>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match pipeline {
        Some(pipeline) => register_pipeline_job(&scheduler, pipeline, cron).await?,
        None => tracing::warn!("scheduler: no pipeline configured; weekly run not registered"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_pipeline_job(
    scheduler: &JobScheduler,
    pipeline: Arc<Pipeline>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);
        Box::pin(async move {
            run_scheduled(&pipeline).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered weekly pipeline job");
    Ok(())
}

/// One scheduled tick. Returns `None` when the run was skipped.
async fn run_scheduled(pipeline: &Pipeline) -> Option<PipelineRunReport> {
    tracing::info!("scheduler: starting weekly pipeline run");
    match pipeline.run(RunTrigger::Scheduled).await {
        Ok(report) => {
            tracing::info!(
                run_id = %report.run_id,
                outcome = %report.outcome(),
                stored = report.stored,
                updated = report.updated,
                errored = report.errored,
                "scheduler: weekly pipeline run complete"
            );
            Some(report)
        }
        Err(PipelineError::AlreadyRunning) => {
            tracing::warn!("scheduler: a run is already in progress; skipping this tick");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: weekly pipeline run could not start");
            None
        }
    }
}
