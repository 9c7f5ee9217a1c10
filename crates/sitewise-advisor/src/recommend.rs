//! Feasibility recommendation from a language model, with fixed fallbacks.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sitewise_core::Outcome;
use sitewise_llm::LlmClient;

const RECOMMEND_SYSTEM_PROMPT: &str = "You are a retail site-selection consultant. \
Ground every point in the market data you are given. Answer with a single JSON object \
and nothing else.";

const RECOMMEND_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub suggestions: Vec<String>,
    pub recommendation: String,
}

impl Recommendation {
    /// Used when the model answered but the answer did not parse.
    #[must_use]
    pub fn unparsed_fallback(business_type: &str, area_name: &str) -> Self {
        Self {
            pros: vec!["Market analysis completed".to_string()],
            cons: vec!["Unable to generate detailed recommendations".to_string()],
            suggestions: vec![format!(
                "Consider opening a {business_type} in {area_name} after manual review"
            )],
            recommendation: format!(
                "Further analysis required for {business_type} opportunity in {area_name}"
            ),
        }
    }

    /// Used when the model could not be reached.
    #[must_use]
    pub fn unavailable_fallback(business_type: &str, area_name: &str) -> Self {
        Self {
            pros: vec![
                "Location identified".to_string(),
                "Nearby amenities mapped".to_string(),
            ],
            cons: vec!["Unable to analyze market conditions".to_string()],
            suggestions: vec![format!(
                "Manually research the {business_type} market in {area_name}"
            )],
            recommendation: format!("Manual analysis recommended for {business_type} opportunity"),
        }
    }
}

/// Market facts the recommendation is based on.
#[derive(Debug, Clone, Serialize)]
pub struct MarketBrief {
    pub business_type: String,
    pub area_name: String,
    pub competitor_count: usize,
    pub average_rating: Option<f64>,
    pub average_sentiment: f64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub chain_count: usize,
    pub chain_names: Vec<String>,
    pub top_competitors: Vec<String>,
    /// Amenity type -> places found within range.
    pub amenity_counts: Vec<(String, usize)>,
    pub scraped_items: usize,
}

/// Asks the model for pros, cons, suggestions, and a one-line verdict.
pub async fn recommend(
    llm: &LlmClient,
    call_timeout: Duration,
    brief: &MarketBrief,
) -> Outcome<Recommendation> {
    let prompt = match build_prompt(brief) {
        Ok(prompt) => prompt,
        Err(e) => {
            return Outcome::degraded(
                Recommendation::unavailable_fallback(&brief.business_type, &brief.area_name),
                format!("could not encode market brief: {e}"),
            )
        }
    };
    let call = llm.complete_json(RECOMMEND_SYSTEM_PROMPT, &prompt, RECOMMEND_TEMPERATURE);

    match tokio::time::timeout(call_timeout, call).await {
        Ok(Ok(answer)) => match serde_json::from_value::<Recommendation>(answer) {
            Ok(recommendation) => Outcome::Complete(recommendation),
            Err(e) => {
                tracing::warn!(error = %e, "recommendation answer did not parse");
                Outcome::degraded(
                    Recommendation::unparsed_fallback(&brief.business_type, &brief.area_name),
                    format!("unusable recommendation answer: {e}"),
                )
            }
        },
        Ok(Err(sitewise_llm::LlmError::Deserialize { source, .. })) => {
            tracing::warn!(error = %source, "recommendation answer was not JSON");
            Outcome::degraded(
                Recommendation::unparsed_fallback(&brief.business_type, &brief.area_name),
                format!("recommendation answer was not JSON: {source}"),
            )
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "recommendation call failed");
            Outcome::degraded(
                Recommendation::unavailable_fallback(&brief.business_type, &brief.area_name),
                e.to_string(),
            )
        }
        Err(_) => Outcome::degraded(
            Recommendation::unavailable_fallback(&brief.business_type, &brief.area_name),
            format!("timed out after {}ms", call_timeout.as_millis()),
        ),
    }
}

fn build_prompt(brief: &MarketBrief) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(brief)?;
    Ok(format!(
        "Evaluate opening a new {business_type} in {area}.\n\n\
         Market data:\n{data}\n\n\
         Weigh competition density, competitor ratings, review sentiment, chain presence, \
         and nearby amenities. If competitors are mostly chains, say so in the cons.\n\
         Respond as: {{\"pros\": [4-5 strings], \"cons\": [4-5 strings], \
         \"suggestions\": [5-7 actionable strings], \"recommendation\": one sentence}}",
        business_type = brief.business_type,
        area = brief.area_name,
    ))
}
