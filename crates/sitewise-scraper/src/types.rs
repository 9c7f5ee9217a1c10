use serde::{Deserialize, Serialize};

/// One competitor listing scraped from a third-party directory page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Free-form price band as published, e.g. `"₹₹"` or `"₹500 for two"`.
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Backend that produced the record.
    pub source: String,
}
