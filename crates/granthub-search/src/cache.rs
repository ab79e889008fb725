//! On-disk cache of raw search responses.
//!
//! One JSON file per (engine, query, limit) under an injected directory.
//! Entries past the TTL are ignored and overwritten on the next fetch;
//! nothing is evicted except by [`ResponseCache::clear`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SearchError;
use crate::types::OrganicResult;

#[derive(Debug, Serialize, Deserialize)]
struct CachedSearch {
    captured_at: DateTime<Utc>,
    engine: String,
    query: String,
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: TimeDelta,
}

impl ResponseCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .unwrap_or(TimeDelta::MAX);
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for one search: hex SHA-256 of engine, query and limit.
    #[must_use]
    pub fn key(engine: &str, query: &str, limit: u32) -> String {
        let material = format!("{engine}|{}|{limit}", query.trim().to_lowercase());
        format!("{:x}", Sha256::digest(material.as_bytes()))
    }

    /// Returns the cached results for `key` when present and fresh.
    ///
    /// A corrupt entry is treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the entry exists but cannot be read.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<OrganicResult>>, SearchError> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(cache_error(&path, e)),
        };

        let entry: CachedSearch = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                return Ok(None);
            }
        };

        if Utc::now() - entry.captured_at >= self.ttl {
            tracing::debug!(path = %path.display(), "cache entry expired");
            return Ok(None);
        }

        Ok(Some(entry.organic_results))
    }

    /// Stores `results` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory or file cannot be written.
    pub async fn put(
        &self,
        key: &str,
        engine: &str,
        query: &str,
        results: &[OrganicResult],
    ) -> Result<(), SearchError> {
        let entry = CachedSearch {
            captured_at: Utc::now(),
            engine: engine.to_string(),
            query: query.to_string(),
            organic_results: results.to_vec(),
        };
        self.write_entry(key, &entry).await
    }

    /// Removes every cache entry. Returns the number of files deleted.
    ///
    /// A missing cache directory counts as already clear.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be listed or an
    /// entry cannot be removed.
    pub async fn clear(&self) -> Result<usize, SearchError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(cache_error(&self.dir, e)),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| cache_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| cache_error(&path, e))?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn write_entry(&self, key: &str, entry: &CachedSearch) -> Result<(), SearchError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| cache_error(&self.dir, e))?;

        let path = self.entry_path(key);
        let body = serde_json::to_vec_pretty(entry).map_err(|e| SearchError::Deserialize {
            context: format!("cache entry {}", path.display()),
            source: e,
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| cache_error(&path, e))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn cache_error(path: &Path, source: std::io::Error) -> SearchError {
    SearchError::Cache {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
