use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_RESULT_LIMIT: u32 = 5;
pub const DEFAULT_SEARCH_ENGINE: &str = "google";
const MAX_RESULT_LIMIT: u32 = 100;

fn default_result_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}

fn default_engine() -> String {
    DEFAULT_SEARCH_ENGINE.to_string()
}

/// A school profile: who we search for, how, and what counts as relevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolConfig {
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Mission keywords. Each hit in a listing adds to its keyword score.
    #[serde(default)]
    pub priority_keywords: Vec<String>,
    /// Each hit subtracts from the keyword score.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub eligibility_notes: Option<String>,
    pub queries: Vec<String>,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_engine")]
    pub engine: String,
}

#[derive(Debug, Deserialize)]
pub struct SchoolsFile {
    pub schools: Vec<SchoolConfig>,
}

impl SchoolsFile {
    /// Total number of (school, query) units a run will iterate.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.schools.iter().map(|s| s.queries.len()).sum()
    }
}

/// Load and validate the school profiles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_schools(path: &Path) -> Result<SchoolsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SchoolsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let schools_file: SchoolsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SchoolsFileParse)?;

    validate_schools(&schools_file)?;

    Ok(schools_file)
}

fn validate_schools(schools_file: &SchoolsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for school in &schools_file.schools {
        if school.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "school name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(school.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate school name: '{}'",
                school.name
            )));
        }

        if school.queries.iter().all(|q| q.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "school '{}' must define at least one search query",
                school.name
            )));
        }

        if school.result_limit == 0 || school.result_limit > MAX_RESULT_LIMIT {
            return Err(ConfigError::Validation(format!(
                "school '{}' has invalid result_limit {}; must be 1..={MAX_RESULT_LIMIT}",
                school.name, school.result_limit
            )));
        }

        if school.engine.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "school '{}' has an empty search engine",
                school.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "schools_test.rs"]
mod tests;
