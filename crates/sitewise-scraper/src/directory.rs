//! Listing-page scraper driven by per-category URL templates.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::ScraperError;
use crate::jsonld::extract_jsonld_records;
use crate::types::ScrapedRecord;
use crate::CompetitorScraper;

const SOURCE: &str = "jsonld_directory";

/// Cap on records taken from one listing page.
pub const MAX_RECORDS: usize = 50;

/// Fetches a configured listing URL and reads its schema.org JSON-LD.
///
/// Templates are keyed by category (`"cafe"`, `"hotel"`, ...) and may contain
/// `{business}` and `{location}` placeholders, which are percent-encoded on
/// substitution. A business type is matched to the first category key it
/// contains.
pub struct JsonLdDirectoryScraper {
    client: Client,
    templates: BTreeMap<String, String>,
}

impl JsonLdDirectoryScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidTemplate`] if a template is not an
    /// http(s) URL.
    pub fn new(
        templates: BTreeMap<String, String>,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        for template in templates.values() {
            if !(template.starts_with("http://") || template.starts_with("https://")) {
                return Err(ScraperError::InvalidTemplate {
                    template: template.clone(),
                    reason: "must be an http(s) URL".to_string(),
                });
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, templates })
    }

    fn template_for(&self, business_type: &str) -> Option<&str> {
        let lowered = business_type.to_lowercase();
        self.templates
            .iter()
            .find(|(category, _)| lowered.contains(category.as_str()))
            .map(|(_, template)| template.as_str())
    }

    /// Renders the listing URL for a query, or `None` if no template matches.
    #[must_use]
    pub fn listing_url(&self, business_type: &str, location: &str) -> Option<String> {
        self.template_for(business_type)
            .map(|template| render_template(template, business_type, location))
    }
}

pub(crate) fn render_template(template: &str, business_type: &str, location: &str) -> String {
    let business = utf8_percent_encode(business_type.trim(), NON_ALPHANUMERIC).to_string();
    let location = utf8_percent_encode(location.trim(), NON_ALPHANUMERIC).to_string();
    template
        .replace("{business}", &business)
        .replace("{location}", &location)
}

#[async_trait]
impl CompetitorScraper for JsonLdDirectoryScraper {
    fn name(&self) -> &str {
        SOURCE
    }

    fn supports(&self, business_type: &str) -> bool {
        self.template_for(business_type).is_some()
    }

    async fn scrape(
        &self,
        business_type: &str,
        location: &str,
    ) -> Result<Vec<ScrapedRecord>, ScraperError> {
        let url = self
            .listing_url(business_type, location)
            .ok_or_else(|| ScraperError::Unsupported {
                business_type: business_type.to_string(),
            })?;

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        let mut records = extract_jsonld_records(&html, SOURCE);
        records.truncate(MAX_RECORDS);

        tracing::debug!(url, count = records.len(), "directory page scraped");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> JsonLdDirectoryScraper {
        let templates = BTreeMap::from([
            (
                "cafe".to_string(),
                "https://listings.example/{location}/search?q={business}".to_string(),
            ),
            (
                "hotel".to_string(),
                "https://stays.example/hotels?city={location}".to_string(),
            ),
        ]);
        JsonLdDirectoryScraper::new(templates, "sitewise-test", 10).expect("valid templates")
    }

    #[test]
    fn render_encodes_placeholders() {
        let url = render_template(
            "https://x.example/{location}?q={business}",
            "coffee & tea",
            "Sector 70, Mohali",
        );
        assert_eq!(
            url,
            "https://x.example/Sector%2070%2C%20Mohali?q=coffee%20%26%20tea"
        );
    }

    #[test]
    fn supports_by_category_substring() {
        let s = scraper();
        assert!(s.supports("cafe"));
        assert!(s.supports("Boutique Hotel"));
        assert!(!s.supports("gym"));
    }

    #[test]
    fn listing_url_uses_matching_template() {
        let s = scraper();
        assert_eq!(
            s.listing_url("hotel", "Mohali").as_deref(),
            Some("https://stays.example/hotels?city=Mohali")
        );
        assert!(s.listing_url("school", "Mohali").is_none());
    }

    #[test]
    fn rejects_non_http_templates() {
        let templates =
            BTreeMap::from([("cafe".to_string(), "ftp://listings.example".to_string())]);
        let err = JsonLdDirectoryScraper::new(templates, "sitewise-test", 10)
            .err()
            .expect("ftp template should be rejected");
        assert!(matches!(err, ScraperError::InvalidTemplate { .. }));
    }
}
