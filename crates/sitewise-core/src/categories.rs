use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Search vocabulary: which maps query to send for a business type, which
/// amenities to look up, and where competitor listings can be scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Business type -> places search query.
    #[serde(default)]
    pub business_queries: BTreeMap<String, String>,
    /// Amenity type -> places search query.
    #[serde(default)]
    pub amenity_queries: BTreeMap<String, String>,
    /// Free-form business type -> canonical key of `business_queries`.
    #[serde(default)]
    pub business_aliases: BTreeMap<String, String>,
    /// Business types for which competitor scraping runs.
    #[serde(default)]
    pub scrape_categories: Vec<String>,
    /// Scraper listing URL templates per category, with `{business}` and
    /// `{location}` placeholders.
    #[serde(default)]
    pub scraper_urls: BTreeMap<String, String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let business_queries = [
            ("cafe", "cafe coffee shop"),
            ("restaurant", "restaurant dining"),
            ("sneaker store", "sneaker store shoe shop"),
            ("pharmacy", "pharmacy medical store"),
            ("grocery shop", "grocery supermarket"),
            ("clothing store", "clothing fashion store"),
            ("electronics store", "electronics store"),
            ("bookstore", "bookstore"),
            ("bakery", "bakery"),
            ("barbershop", "barbershop hair salon"),
            ("gym", "gym fitness center"),
            ("bank", "bank financial services"),
            ("hotel", "hotel lodging"),
            ("jewellery shop", "jewellery jewelry store"),
            ("school", "schools primary secondary"),
        ];
        let amenity_queries = [
            ("hospital", "hospitals medical centers"),
            ("clinic", "clinics healthcare centers"),
            ("school", "schools primary secondary"),
            ("university", "universities colleges higher education"),
            ("library", "public libraries"),
            ("park", "parks recreation areas"),
        ];
        let business_aliases = [
            ("coffee shop", "cafe"),
            ("mobile shop", "electronics store"),
            ("mobile store", "electronics store"),
            ("phone shop", "electronics store"),
            ("electronics shop", "electronics store"),
            ("grocery", "grocery shop"),
            ("grocery store", "grocery shop"),
            ("medical store", "pharmacy"),
            ("shoe shop", "sneaker store"),
            ("shoe store", "sneaker store"),
            ("jewelry store", "jewellery shop"),
        ];

        Self {
            business_queries: to_map(&business_queries),
            amenity_queries: to_map(&amenity_queries),
            business_aliases: to_map(&business_aliases),
            scrape_categories: ["cafe", "restaurant", "hotel", "school"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            scraper_urls: BTreeMap::new(),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl CategoryConfig {
    /// Map a free-form business type onto a configured key.
    ///
    /// Lower-cases and trims, then applies `business_aliases`. Unknown types
    /// are returned normalised but otherwise unchanged.
    #[must_use]
    pub fn canonical_business_type(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        self.business_aliases
            .get(&lowered)
            .cloned()
            .unwrap_or(lowered)
    }

    /// Places search query for a business type; the type itself when unmapped.
    #[must_use]
    pub fn search_query(&self, business_type: &str) -> String {
        let key = self.canonical_business_type(business_type);
        self.business_queries.get(&key).cloned().unwrap_or(key)
    }

    /// Whether competitor scraping applies to this business type.
    #[must_use]
    pub fn should_scrape(&self, business_type: &str) -> bool {
        let lowered = business_type.to_lowercase();
        self.scrape_categories
            .iter()
            .any(|c| lowered.contains(c.as_str()))
    }
}

/// Load and validate the category vocabulary from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoryConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: CategoryConfig = serde_yaml::from_str(&content)?;
    validate_categories(&config)?;
    Ok(config)
}

/// Like [`load_categories`], but a missing file yields the built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// validated.
pub fn load_categories_or_default(path: &Path) -> Result<CategoryConfig, ConfigError> {
    if path.exists() {
        load_categories(path)
    } else {
        Ok(CategoryConfig::default())
    }
}

fn validate_categories(config: &CategoryConfig) -> Result<(), ConfigError> {
    if config.business_queries.is_empty() {
        return Err(ConfigError::Validation(
            "business_queries must not be empty".to_string(),
        ));
    }

    for (kind, queries) in [
        ("business", &config.business_queries),
        ("amenity", &config.amenity_queries),
    ] {
        for (key, query) in queries {
            if key.trim().is_empty() || query.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{kind} query entries must have a non-empty key and query (key '{key}')"
                )));
            }
            if key.to_lowercase() != *key {
                return Err(ConfigError::Validation(format!(
                    "{kind} key '{key}' must be lower-case"
                )));
            }
        }
    }

    let mut seen = HashSet::new();
    for (alias, target) in &config.business_aliases {
        if !config.business_queries.contains_key(target) {
            return Err(ConfigError::Validation(format!(
                "alias '{alias}' points at unknown business type '{target}'"
            )));
        }
        if !seen.insert(alias.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate alias '{alias}'"
            )));
        }
    }

    for (category, template) in &config.scraper_urls {
        if !template.starts_with("http://") && !template.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "scraper url for '{category}' must be http(s): '{template}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<CategoryConfig, ConfigError> {
        let config: CategoryConfig = serde_yaml::from_str(yaml)?;
        validate_categories(&config)?;
        Ok(config)
    }

    #[test]
    fn defaults_validate() {
        validate_categories(&CategoryConfig::default()).expect("defaults must be valid");
    }

    #[test]
    fn aliases_map_to_canonical_type() {
        let config = CategoryConfig::default();
        assert_eq!(config.canonical_business_type("Coffee Shop"), "cafe");
        assert_eq!(config.canonical_business_type(" shoe store "), "sneaker store");
        assert_eq!(config.canonical_business_type("tattoo parlour"), "tattoo parlour");
    }

    #[test]
    fn search_query_falls_back_to_type() {
        let config = CategoryConfig::default();
        assert_eq!(config.search_query("cafe"), "cafe coffee shop");
        assert_eq!(config.search_query("coffee shop"), "cafe coffee shop");
        assert_eq!(config.search_query("florist"), "florist");
    }

    #[test]
    fn scrape_categories_match_by_substring() {
        let config = CategoryConfig::default();
        assert!(config.should_scrape("cafe"));
        assert!(config.should_scrape("boutique hotel"));
        assert!(!config.should_scrape("gym"));
    }

    #[test]
    fn parses_minimal_yaml() {
        let config = parse(
            "business_queries:\n  cafe: cafe coffee shop\namenity_queries:\n  park: parks\n",
        )
        .expect("valid yaml");
        assert_eq!(config.business_queries.len(), 1);
        assert!(config.business_aliases.is_empty());
    }

    #[test]
    fn rejects_alias_to_unknown_type() {
        let result = parse(
            "business_queries:\n  cafe: cafe\nbusiness_aliases:\n  coffee shop: coffeehouse\n",
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_empty_business_queries() {
        let result = parse("amenity_queries:\n  park: parks\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_non_http_scraper_url() {
        let result = parse(
            "business_queries:\n  cafe: cafe\nscraper_urls:\n  cafe: ftp://listings.example\n",
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config =
            load_categories_or_default(Path::new("/definitely/not/here/categories.yaml"))
                .expect("missing file falls back");
        assert_eq!(config, CategoryConfig::default());
    }
}
