use std::path::PathBuf;

use crate::geo::Coordinates;

/// Tunables for local-chain detection.
///
/// The defaults are empirical values with no documented derivation; they are
/// kept configurable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainDetectionConfig {
    /// Minimum normalized edit-distance similarity for two brand keys to be
    /// treated as the same brand.
    pub similarity_threshold: f64,
    /// Minimum distance between two listings for them to count as separate
    /// physical locations.
    pub min_separation_km: f64,
    /// Number of leading words kept in a canonical brand key.
    pub brand_key_tokens: usize,
}

impl Default for ChainDetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            min_separation_km: 0.5,
            brand_key_tokens: 3,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub serpapi_key: String,
    pub serpapi_base_url: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub geocoder_base_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub city_businesses_path: PathBuf,
    pub properties_path: PathBuf,
    pub categories_path: PathBuf,
    pub cache_url: Option<String>,
    pub log_level: String,
    pub chain_detection: ChainDetectionConfig,
    pub classify_concurrency: usize,
    pub default_center: Coordinates,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("serpapi_key", &"[redacted]")
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("user_agent", &self.user_agent)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("city_businesses_path", &self.city_businesses_path)
            .field("properties_path", &self.properties_path)
            .field("categories_path", &self.categories_path)
            .field("cache_url", &self.cache_url)
            .field("log_level", &self.log_level)
            .field("chain_detection", &self.chain_detection)
            .field("classify_concurrency", &self.classify_concurrency)
            .field("default_center", &self.default_center)
            .finish()
    }
}
