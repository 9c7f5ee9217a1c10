//! Branded-vs-independent classification backed by a language model.
//!
//! Classification never fails: any problem with the model call turns into
//! the fallback classification wrapped in [`Outcome::Degraded`].

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use sitewise_core::{BrandClassification, BusinessRecord, ClassificationSource, Outcome};
use sitewise_llm::LlmClient;

const SYSTEM_PROMPT: &str = "You classify businesses as branded chains or local independents. \
Answer with a single JSON object and nothing else.";

const CLASSIFY_TEMPERATURE: f32 = 0.1;

#[async_trait]
pub trait BrandClassifier: Send + Sync {
    /// Classifies one business. `category` is the business type and
    /// `area_hint` names the surrounding area.
    async fn classify(
        &self,
        name: &str,
        category: &str,
        area_hint: &str,
    ) -> Outcome<BrandClassification>;
}

/// [`BrandClassifier`] that asks a chat model, bounded by a per-call timeout.
pub struct LlmBrandClassifier {
    client: LlmClient,
    call_timeout: Duration,
}

impl LlmBrandClassifier {
    #[must_use]
    pub fn new(client: LlmClient, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }
}

#[async_trait]
impl BrandClassifier for LlmBrandClassifier {
    async fn classify(
        &self,
        name: &str,
        category: &str,
        area_hint: &str,
    ) -> Outcome<BrandClassification> {
        let prompt = build_prompt(name, category, area_hint);
        let call = self
            .client
            .complete_json(SYSTEM_PROMPT, &prompt, CLASSIFY_TEMPERATURE);

        let answer = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => return fallback(name, e.to_string()),
            Err(_) => {
                return fallback(
                    name,
                    format!("timed out after {}ms", self.call_timeout.as_millis()),
                )
            }
        };

        match parse_verdict(name, answer) {
            Ok(classification) => Outcome::Complete(classification),
            Err(reason) => fallback(name, reason),
        }
    }
}

/// Classifies every record, running up to `concurrency` calls at once.
///
/// Results line up with `records`. A record's own category is used when
/// present, `business_type` otherwise.
pub async fn classify_all(
    classifier: &dyn BrandClassifier,
    records: &[BusinessRecord],
    business_type: &str,
    area_hint: &str,
    concurrency: usize,
) -> Vec<Outcome<BrandClassification>> {
    futures::stream::iter(records.iter().map(|record| {
        let category = if record.category.trim().is_empty() {
            business_type
        } else {
            record.category.as_str()
        };
        classifier.classify(&record.name, category, area_hint)
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}

fn fallback(name: &str, reason: String) -> Outcome<BrandClassification> {
    tracing::warn!(business = %name, reason = %reason, "brand classification fell back to default");
    Outcome::degraded(BrandClassification::fallback(name), reason)
}

fn build_prompt(name: &str, category: &str, area_hint: &str) -> String {
    let area = if area_hint.trim().is_empty() {
        "unknown"
    } else {
        area_hint
    };
    format!(
        "Business name: {name}\n\
         Business type: {category}\n\
         Area: {area}\n\n\
         Decide whether this business is part of a known chain or franchise with \
         several locations (branded) or a single-location independent (local). \
         Only answer branded when you are confident. Respond as:\n\
         {{\"is_branded\": bool, \"brand_name\": string, \"confidence\": number between 0 and 1, \
         \"reasoning\": string, \"classification_type\": \"branded\" | \"local\"}}"
    )
}

#[derive(Debug, Deserialize)]
struct Verdict {
    is_branded: bool,
    brand_name: String,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

/// Validates the model's answer; any missing or wrong-typed field is an error.
fn parse_verdict(name: &str, answer: serde_json::Value) -> Result<BrandClassification, String> {
    let verdict: Verdict = serde_json::from_value(answer)
        .map_err(|e| format!("unexpected classification shape: {e}"))?;

    if !verdict.confidence.is_finite() {
        return Err("confidence is not a number".to_string());
    }

    let brand_name = if verdict.brand_name.trim().is_empty() {
        name.to_string()
    } else {
        verdict.brand_name.trim().to_string()
    };

    Ok(BrandClassification {
        is_branded: verdict.is_branded,
        brand_name,
        confidence: verdict.confidence.clamp(0.0, 1.0),
        reasoning: verdict.reasoning,
        source: ClassificationSource::LlmJudgment,
    })
}
