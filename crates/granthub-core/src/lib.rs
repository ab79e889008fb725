//! Shared configuration and domain types for the grant hub.

pub mod app_config;
pub mod config;
pub mod deadline;
pub mod listing;
pub mod schools;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deadline::{extract_deadline, find_deadline_text, parse_deadline, Deadline, DeadlineWindow};
pub use listing::{normalize_listing_url, NewGrant, RawListing};
pub use schools::{
    load_schools, SchoolConfig, SchoolsFile, DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_ENGINE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read schools file {path}: {source}")]
    SchoolsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schools file: {0}")]
    SchoolsFileParse(#[from] serde_yaml::Error),

    #[error("schools config validation failed: {0}")]
    Validation(String),
}
