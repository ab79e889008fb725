//! Manual pipeline trigger.

use granthub_pipeline::{Pipeline, PipelineRunReport, RunOutcome, RunTrigger};

/// Run the pipeline once and print its report.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built (missing provider keys,
/// unreadable school profiles), if a run is already active in this or any
/// other process sharing the database (the server's weekly job), or if the
/// run finished with outcome `failed`. The report is printed before the
/// failure is returned.
pub(crate) async fn run_pipeline(
    pool: sqlx::PgPool,
    config: &granthub_core::AppConfig,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config, pool)?;
    let report = pipeline.run(RunTrigger::Manual).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", summarize(&report));
    }

    if report.outcome() == RunOutcome::Failed {
        anyhow::bail!(
            "pipeline run {} failed: {} errors, nothing stored",
            report.run_id,
            report.errored
        );
    }

    Ok(())
}

pub(crate) fn summarize(report: &PipelineRunReport) -> String {
    format!(
        "run {id} ({outcome})\n  \
         units:         {units}\n  \
         scraped:       {scraped} ({duplicates} duplicates)\n  \
         accepted:      {accepted}\n  \
         rejected:      {rejected}\n  \
         out of window: {out_of_window}\n  \
         stored:        {stored}\n  \
         updated:       {updated}\n  \
         errored:       {errored}\n",
        id = report.run_id,
        outcome = report.outcome(),
        units = report.units,
        scraped = report.scraped,
        duplicates = report.duplicates,
        accepted = report.accepted,
        rejected = report.rejected,
        out_of_window = report.out_of_window,
        stored = report.stored,
        updated = report.updated,
        errored = report.errored,
    )
}
