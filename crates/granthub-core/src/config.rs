use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PIPELINE_CRON: &str = "0 0 6 * * MON";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        or_default(var, default)
            .parse::<i32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("GRANTHUB_ENV", "development"))?;
    let debug = parse_bool("GRANTHUB_DEBUG", &or_default("GRANTHUB_DEBUG", "false"))?;

    let bind_addr = parse_addr("GRANTHUB_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default(
        "GRANTHUB_LOG_LEVEL",
        if debug { "debug" } else { "info" },
    );
    let allowed_origins = split_list(&or_default("GRANTHUB_ALLOWED_ORIGINS", "*"));
    let api_keys = split_list(&or_default("GRANTHUB_API_KEYS", ""));
    let schools_path = PathBuf::from(or_default(
        "GRANTHUB_SCHOOLS_PATH",
        "./config/schools.yaml",
    ));

    let serp_api_key = optional("SERP_API_KEY");
    let serpapi_base_url = or_default("GRANTHUB_SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE_URL);
    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_base_url = or_default("GRANTHUB_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
    let gemini_model = or_default("GRANTHUB_GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
    let http_timeout_secs = parse_u64("GRANTHUB_HTTP_TIMEOUT_SECS", "30")?;

    let search_cache_dir = PathBuf::from(or_default(
        "GRANTHUB_SEARCH_CACHE_DIR",
        "./.cache/search",
    ));
    let search_cache_ttl_hours = parse_u64("GRANTHUB_SEARCH_CACHE_TTL_HOURS", "24")?;

    let max_deadline_days = parse_u32("GRANTHUB_MAX_DEADLINE_DAYS", "365")?;
    let relevance_threshold = parse_i32("GRANTHUB_RELEVANCE_THRESHOLD", "2")?;
    let ai_rate_limit_secs = parse_u64("GRANTHUB_AI_RATE_LIMIT_SECS", "5")?;
    let rate_limit_backoff_secs = parse_u64("GRANTHUB_RATE_LIMIT_BACKOFF_SECS", "30")?;
    let pipeline_cron = or_default("GRANTHUB_PIPELINE_CRON", DEFAULT_PIPELINE_CRON);

    let db_max_connections = parse_u32("GRANTHUB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GRANTHUB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("GRANTHUB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        debug,
        log_level,
        allowed_origins,
        api_keys,
        schools_path,
        serp_api_key,
        serpapi_base_url,
        gemini_api_key,
        gemini_base_url,
        gemini_model,
        http_timeout_secs,
        search_cache_dir,
        search_cache_ttl_hours,
        max_deadline_days,
        relevance_threshold,
        ai_rate_limit_secs,
        rate_limit_backoff_secs,
        pipeline_cron,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GRANTHUB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
