use granthub_core::ConfigError;
use granthub_db::DbError;
use granthub_filter::FilterError;
use granthub_search::SearchError;
use thiserror::Error;

/// Errors that keep a run from starting. Failures inside a run are counted in
/// the report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a pipeline run is already in progress")]
    AlreadyRunning,

    #[error("failed to take the pipeline run lock: {0}")]
    RunLock(#[source] DbError),

    #[error("{0} is not set; the pipeline cannot be built without it")]
    MissingApiKey(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build search client: {0}")]
    Search(#[from] SearchError),

    #[error("failed to build relevance filter: {0}")]
    Filter(#[from] FilterError),
}
