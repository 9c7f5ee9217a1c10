use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, ChainDetectionConfig};
use crate::geo::Coordinates;
use crate::ConfigError;

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
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let serpapi_key = require("SERPAPI_KEY")?;
    let llm_api_key = require("SITEWISE_LLM_API_KEY")?;

    let serpapi_base_url = or_default("SITEWISE_SERPAPI_BASE_URL", "https://serpapi.com");
    let llm_base_url = or_default("SITEWISE_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("SITEWISE_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs: u64 = parse_var(&lookup, "SITEWISE_LLM_TIMEOUT_SECS", "30")?;
    let geocoder_base_url = or_default(
        "SITEWISE_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    let user_agent = or_default("SITEWISE_USER_AGENT", "sitewise/0.1 (site-feasibility)");
    let http_timeout_secs: u64 = parse_var(&lookup, "SITEWISE_HTTP_TIMEOUT_SECS", "30")?;
    let request_delay_ms: u64 = parse_var(&lookup, "SITEWISE_REQUEST_DELAY_MS", "500")?;

    let city_businesses_path = PathBuf::from(or_default(
        "SITEWISE_CITY_BUSINESSES_PATH",
        "./data/city_businesses.csv",
    ));
    let properties_path =
        PathBuf::from(or_default("SITEWISE_PROPERTIES_PATH", "./data/properties.csv"));
    let categories_path = PathBuf::from(or_default(
        "SITEWISE_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));
    let cache_url = lookup("SITEWISE_CACHE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let log_level = or_default("SITEWISE_LOG_LEVEL", "info");

    let similarity_threshold: f64 = parse_var(&lookup, "SITEWISE_CHAIN_SIMILARITY", "0.85")?;
    if !(0.0..=1.0).contains(&similarity_threshold) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITEWISE_CHAIN_SIMILARITY".to_string(),
            reason: format!("{similarity_threshold} is outside 0.0..=1.0"),
        });
    }
    let min_separation_km: f64 =
        parse_var(&lookup, "SITEWISE_CHAIN_MIN_SEPARATION_KM", "0.5")?;
    // NaN would make every distance comparison false in the detector.
    if !min_separation_km.is_finite() || min_separation_km < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITEWISE_CHAIN_MIN_SEPARATION_KM".to_string(),
            reason: format!("{min_separation_km} is not a finite non-negative distance"),
        });
    }
    let brand_key_tokens: usize = parse_var(&lookup, "SITEWISE_CHAIN_KEY_TOKENS", "3")?;
    if brand_key_tokens == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITEWISE_CHAIN_KEY_TOKENS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let classify_concurrency: usize =
        parse_var(&lookup, "SITEWISE_CLASSIFY_CONCURRENCY", "4")?;

    let default_center = Coordinates::new(
        parse_bounded(&lookup, "SITEWISE_DEFAULT_LATITUDE", "30.6818636", 90.0)?,
        parse_bounded(&lookup, "SITEWISE_DEFAULT_LONGITUDE", "76.6924349", 180.0)?,
    );

    Ok(AppConfig {
        serpapi_key,
        serpapi_base_url,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        geocoder_base_url,
        user_agent,
        http_timeout_secs,
        request_delay_ms,
        city_businesses_path,
        properties_path,
        categories_path,
        cache_url,
        log_level,
        chain_detection: ChainDetectionConfig {
            similarity_threshold,
            min_separation_km,
            brand_key_tokens,
        },
        classify_concurrency: classify_concurrency.max(1),
        default_center,
    })
}

/// Parses a finite float within `-limit..=limit`.
fn parse_bounded<F>(lookup: &F, var: &str, default: &str, limit: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let value: f64 = parse_var(lookup, var, default)?;
    if (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("{value} is outside -{limit}..={limit}"),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
