use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Reasoning attached to a classification that fell back to the safe default.
pub const FALLBACK_CLASSIFICATION_REASONING: &str = "fallback classification due to error";

/// One business returned by the places search for the current query.
///
/// Built at the ingestion boundary; every optional field here is genuinely
/// optional for consumers, and coordinates are always present (defaulted to
/// the search centre when the source omitted them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Star rating in `0.0..=5.0`.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub category: String,
    /// Opaque search-engine key, used to fetch reviews.
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    pub coordinates: Coordinates,
}

impl BusinessRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: None,
            rating: None,
            review_count: 0,
            category: String::new(),
            external_id: None,
            price: None,
            coordinates,
        }
    }
}

/// One customer review of a competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub business_name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// One entry of the pre-built city-wide business list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBusiness {
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    CityIndex,
    ResultCluster,
    LlmJudgment,
}

impl std::fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationSource::CityIndex => write!(f, "city_index"),
            ClassificationSource::ResultCluster => write!(f, "result_cluster"),
            ClassificationSource::LlmJudgment => write!(f, "llm_judgment"),
        }
    }
}

/// Branded-vs-independent judgment for one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandClassification {
    pub is_branded: bool,
    pub brand_name: String,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
    pub reasoning: String,
    pub source: ClassificationSource,
}

impl BrandClassification {
    /// The fail-closed default used when the model call cannot complete.
    #[must_use]
    pub fn fallback(business_name: &str) -> Self {
        Self {
            is_branded: false,
            brand_name: business_name.to_string(),
            confidence: 0.5,
            reasoning: FALLBACK_CLASSIFICATION_REASONING.to_string(),
            source: ClassificationSource::LlmJudgment,
        }
    }
}
