//! schema.org JSON-LD extraction from directory listing pages.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::ScrapedRecord;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// schema.org types that describe a competitor we care about.
const ACCEPTED_TYPES: [&str; 12] = [
    "LocalBusiness",
    "FoodEstablishment",
    "Restaurant",
    "CafeOrCoffeeShop",
    "Bakery",
    "FastFoodRestaurant",
    "LodgingBusiness",
    "Hotel",
    "School",
    "EducationalOrganization",
    "Store",
    "HealthAndBeautyBusiness",
];

/// Extract business listings from `<script type="application/ld+json">`
/// blocks. Blocks that are not valid JSON are skipped.
pub(crate) fn extract_jsonld_records(html: &str, source: &str) -> Vec<ScrapedRecord> {
    let mut results = Vec::new();

    for cap in SCRIPT_RE.captures_iter(html) {
        let Some(json_text) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(json_text) else {
            continue;
        };

        let mut candidates = Vec::new();
        collect_candidates(&value, &mut candidates);

        results.extend(
            candidates
                .into_iter()
                .filter_map(|item| item_to_record(item, source)),
        );
    }

    results
}

/// Flattens arrays, `@graph` containers, and `ItemList` wrappers.
fn collect_candidates<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_candidates(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect_candidates(graph, out);
            }
            if let Some(list) = map.get("itemListElement") {
                collect_candidates(list, out);
            }
            // ListItem wraps the business in `item`.
            if let Some(inner) = map.get("item").filter(|v| v.is_object()) {
                collect_candidates(inner, out);
            }
            out.push(value);
        }
        _ => {}
    }
}

fn type_matches(type_node: &Value) -> bool {
    let accepted = |s: &str| ACCEPTED_TYPES.iter().any(|t| s.eq_ignore_ascii_case(t));
    match type_node {
        Value::String(s) => accepted(s),
        Value::Array(items) => items.iter().filter_map(Value::as_str).any(accepted),
        _ => false,
    }
}

fn non_blank_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers may arrive as JSON numbers or strings.
fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(|v| {
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
    })
}

/// A string, a comma-separated string, or an array of strings / named objects.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(_) => non_blank_str(item.get("name")),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn item_to_record(item: &Value, source: &str) -> Option<ScrapedRecord> {
    if !type_matches(item.get("@type")?) {
        return None;
    }
    let name = non_blank_str(item.get("name"))?;

    let address_node = item.get("address");
    let (address, locality) = match address_node {
        Some(Value::String(s)) => (Some(s.trim().to_string()).filter(|s| !s.is_empty()), None),
        Some(node) => (
            non_blank_str(node.get("streetAddress")),
            non_blank_str(node.get("addressLocality")),
        ),
        None => (None, None),
    };

    let rating = number(
        item.get("aggregateRating")
            .and_then(|r| r.get("ratingValue")),
    )
    .filter(|r| (0.0..=5.0).contains(r));

    Some(ScrapedRecord {
        name,
        rating,
        price_range: non_blank_str(item.get("priceRange")),
        address,
        locality,
        cuisines: string_list(item.get("servesCuisine")),
        amenities: string_list(item.get("amenityFeature")),
        url: non_blank_str(item.get("url")),
        source: source.to_string(),
    })
}

#[cfg(test)]
#[path = "jsonld_test.rs"]
mod tests;
