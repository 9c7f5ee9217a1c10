//! Query understanding: business type, place name, and query kind.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sitewise_core::{CategoryConfig, Outcome};
use sitewise_llm::LlmClient;

use crate::properties::PropertyCatalog;

/// Business type used when a query names none.
pub const DEFAULT_BUSINESS_TYPE: &str = "cafe";

const INTENT_SYSTEM_PROMPT: &str = "You extract search parameters from questions about \
opening a business. Answer with a single JSON object and nothing else.";

const INTENT_TEMPERATURE: f32 = 0.0;

const BRANDED_KEYWORDS: &[&str] = &[
    "branded",
    "chain",
    "franchise",
    "brand",
    "chain store",
    "franchise store",
    "tell me",
    "show me",
    "list",
    "find",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "shoe",
    "sneaker",
    "cafe",
    "coffee",
    "pharmacy",
    "grocery",
    "clothing",
    "electronics",
    "restaurant",
];

/// Keyword patterns tried in order when the model cannot answer.
static FALLBACK_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"cafe|coffee", "cafe"),
        (r"restaurant|dining", "restaurant"),
        (r"shoe|sneaker", "sneaker store"),
        (r"pharmacy|medicine", "pharmacy"),
        (r"grocery|supermarket", "grocery shop"),
        (r"clothing|apparel", "clothing store"),
        (r"book", "bookstore"),
        (r"electronics|tech", "electronics store"),
        // Branded lookups with no category keyword; must stay last.
        (r"branded.*store", "branded store"),
    ]
    .into_iter()
    .map(|(pattern, business_type)| {
        (
            Regex::new(pattern).expect("valid regex"),
            business_type,
        )
    })
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// "Show me branded shoe shops near X".
    BrandedStoreLookup,
    BusinessAnalysis,
}

impl QueryKind {
    /// A branded keyword and a business keyword must both appear.
    #[must_use]
    pub fn of(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let branded = BRANDED_KEYWORDS.iter().any(|k| lowered.contains(k));
        let business = BUSINESS_KEYWORDS.iter().any(|k| lowered.contains(k));
        if branded && business {
            Self::BrandedStoreLookup
        } else {
            Self::BusinessAnalysis
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::BrandedStoreLookup => write!(f, "branded_store_lookup"),
            QueryKind::BusinessAnalysis => write!(f, "business_analysis"),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub query: String,
    /// Canonical business type, e.g. `"electronics store"` for "mobile shop".
    pub business_type: String,
    /// Place or property named in the query; empty when none was found.
    pub property_name: String,
    pub kind: QueryKind,
}

#[derive(Debug, Deserialize)]
struct ExtractedIntent {
    #[serde(default)]
    business_type: String,
    #[serde(default)]
    property_name: String,
}

/// Extracts the intent of `query`, asking the model first.
///
/// A model failure, timeout, or unusable answer falls back to keyword
/// matching and catalog lookup, reported as [`Outcome::Degraded`]. An empty
/// query is the default business type with no place.
pub async fn extract_intent(
    llm: &LlmClient,
    call_timeout: Duration,
    categories: &CategoryConfig,
    catalog: &PropertyCatalog,
    query: &str,
) -> Outcome<Intent> {
    let query = query.trim();
    if query.is_empty() {
        tracing::info!("empty query; using default business type and location");
        return Outcome::Complete(Intent {
            query: String::new(),
            business_type: DEFAULT_BUSINESS_TYPE.to_string(),
            property_name: String::new(),
            kind: QueryKind::BusinessAnalysis,
        });
    }

    let kind = QueryKind::of(query);
    let prompt = build_prompt(query);
    let call = llm.complete_json(INTENT_SYSTEM_PROMPT, &prompt, INTENT_TEMPERATURE);

    let extracted = match tokio::time::timeout(call_timeout, call).await {
        Ok(Ok(answer)) => parse_answer(answer),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", call_timeout.as_millis())),
    };

    match extracted {
        Ok(found) => {
            let property_name = if found.property_name.trim().is_empty() {
                property_from_catalog(catalog, query)
            } else {
                found.property_name.trim().to_string()
            };
            let intent = Intent {
                query: query.to_string(),
                business_type: categories.canonical_business_type(&found.business_type),
                property_name,
                kind,
            };
            tracing::info!(
                business_type = %intent.business_type,
                property = %intent.property_name,
                kind = %intent.kind,
                "intent extracted"
            );
            Outcome::Complete(intent)
        }
        Err(reason) => {
            tracing::warn!(reason = %reason, "intent extraction fell back to keyword matching");
            let intent = Intent {
                query: query.to_string(),
                business_type: categories.canonical_business_type(&fallback_business_type(query)),
                property_name: property_from_catalog(catalog, query),
                kind,
            };
            Outcome::degraded(intent, reason)
        }
    }
}

/// Business type from the first matching keyword pattern.
#[must_use]
pub fn fallback_business_type(query: &str) -> String {
    let lowered = query.to_lowercase();
    FALLBACK_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map_or(DEFAULT_BUSINESS_TYPE, |(_, business_type)| *business_type)
        .to_string()
}

fn property_from_catalog(catalog: &PropertyCatalog, query: &str) -> String {
    catalog
        .find_in_query(query)
        .map(|p| p.project_name.clone())
        .unwrap_or_default()
}

fn parse_answer(answer: serde_json::Value) -> Result<ExtractedIntent, String> {
    let found: ExtractedIntent =
        serde_json::from_value(answer).map_err(|e| format!("unusable intent answer: {e}"))?;
    if found.business_type.trim().is_empty() {
        return Err("intent answer has no business type".to_string());
    }
    Ok(found)
}

fn build_prompt(query: &str) -> String {
    format!(
        "Query: \"{query}\"\n\n\
         Extract the type of business the user wants to open and the full name of the \
         place or property they mention, including any city or area.\n\
         Respond as: {{\"business_type\": string, \"property_name\": string}}\n\n\
         Example: \"Tell me branded shoe shop near VIP Road, Chandigarh\" -> \
         {{\"business_type\": \"sneaker store\", \"property_name\": \"VIP Road, Chandigarh\"}}"
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn branded_lookup_needs_both_keyword_kinds() {
        assert_eq!(
            QueryKind::of("Show me branded shoe shops near VIP Road"),
            QueryKind::BrandedStoreLookup
        );
        assert_eq!(
            QueryKind::of("Find a pharmacy in Sector 70"),
            QueryKind::BrandedStoreLookup
        );
        assert_eq!(
            QueryKind::of("I want to open a cafe near The Zirk"),
            QueryKind::BusinessAnalysis
        );
        assert_eq!(QueryKind::of("list gyms"), QueryKind::BusinessAnalysis);
    }

    #[test]
    fn query_kind_displays_snake_case() {
        assert_eq!(QueryKind::BrandedStoreLookup.to_string(), "branded_store_lookup");
        assert_eq!(
            serde_json::to_value(QueryKind::BusinessAnalysis).expect("serialize"),
            json!("business_analysis")
        );
    }

    #[test]
    fn fallback_patterns_apply_in_order() {
        assert_eq!(fallback_business_type("Coffee near Noble Aurellia"), "cafe");
        assert_eq!(fallback_business_type("fine DINING spot"), "restaurant");
        assert_eq!(fallback_business_type("branded shoe outlet"), "sneaker store");
        assert_eq!(fallback_business_type("a tech store"), "electronics store");
        assert_eq!(fallback_business_type("branded store in Zirakpur"), "branded store");
        assert_eq!(fallback_business_type("something near Kharar"), "cafe");
    }

    #[test]
    fn branded_shoe_query_falls_back_to_sneaker_store() {
        let query = "Tell me branded shoe shop near VIP Road, Chandigarh";
        assert_eq!(QueryKind::of(query), QueryKind::BrandedStoreLookup);
        assert_eq!(fallback_business_type(query), "sneaker store");
        assert_eq!(fallback_business_type("branded sneaker store"), "sneaker store");
    }

    #[test]
    fn every_fallback_pattern_is_first_match_for_some_query() {
        let queries = [
            "cafe near Sector 17",
            "restaurant in Mohali",
            "shoe shop on VIP Road",
            "pharmacy near PGI",
            "grocery in Kharar",
            "apparel boutique",
            "book corner",
            "electronics outlet",
            "branded store in Zirakpur",
        ];
        assert_eq!(queries.len(), FALLBACK_PATTERNS.len());
        for (index, query) in queries.iter().enumerate() {
            let first = FALLBACK_PATTERNS
                .iter()
                .position(|(pattern, _)| pattern.is_match(query));
            assert_eq!(first, Some(index), "first match for {query:?}");
        }
    }

    #[test]
    fn answer_without_business_type_is_rejected() {
        assert!(parse_answer(json!({"property_name": "The Zirk"})).is_err());
        assert!(parse_answer(json!(["not", "an", "object"])).is_err());

        let found = parse_answer(json!({"business_type": "mobile shop"})).expect("parse");
        assert_eq!(found.business_type, "mobile shop");
        assert!(found.property_name.is_empty());
    }
}
