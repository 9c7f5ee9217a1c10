//! Routes a business type to the first scraper that handles it.

use sitewise_core::CategoryConfig;

use crate::directory::JsonLdDirectoryScraper;
use crate::error::ScraperError;
use crate::types::ScrapedRecord;
use crate::CompetitorScraper;

pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn CompetitorScraper>>,
    scrape_categories: Vec<String>,
}

impl ScraperRegistry {
    /// An empty registry that scrapes only business types containing one of
    /// `scrape_categories`.
    #[must_use]
    pub fn new(scrape_categories: Vec<String>) -> Self {
        Self {
            scrapers: Vec::new(),
            scrape_categories: scrape_categories
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect(),
        }
    }

    /// Builds the registry from category config. The directory backend is
    /// registered only when at least one listing URL is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory scraper cannot be constructed.
    pub fn from_config(
        categories: &CategoryConfig,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let mut registry = Self::new(categories.scrape_categories.clone());
        if !categories.scraper_urls.is_empty() {
            registry.register(Box::new(JsonLdDirectoryScraper::new(
                categories.scraper_urls.clone(),
                user_agent,
                timeout_secs,
            )?));
        } else if !registry.scrape_categories.is_empty() {
            tracing::info!(
                categories = ?registry.scrape_categories,
                "competitor scraping skipped: no scraper_urls templates configured"
            );
        }
        Ok(registry)
    }

    /// Whether any scraper backend is registered.
    #[must_use]
    pub fn has_backends(&self) -> bool {
        !self.scrapers.is_empty()
    }

    pub fn register(&mut self, scraper: Box<dyn CompetitorScraper>) {
        self.scrapers.push(scraper);
    }

    #[must_use]
    pub fn should_scrape(&self, business_type: &str) -> bool {
        let lowered = business_type.to_lowercase();
        self.scrape_categories
            .iter()
            .any(|c| lowered.contains(c.as_str()))
    }

    /// Scrapes competitors for a query. Never fails: an unsupported business
    /// type yields an empty list, and a backend error is logged and yields an
    /// empty list.
    pub async fn scrape(&self, business_type: &str, location: &str) -> Vec<ScrapedRecord> {
        if business_type.trim().is_empty() || location.trim().is_empty() {
            tracing::debug!("missing business type or location; skipping scrape");
            return Vec::new();
        }
        if !self.should_scrape(business_type) {
            tracing::debug!(business_type, "no scraping for this business type");
            return Vec::new();
        }
        let Some(scraper) = self.scrapers.iter().find(|s| s.supports(business_type)) else {
            tracing::debug!(business_type, "no scraper backend supports this business type");
            return Vec::new();
        };

        match scraper.scrape(business_type, location).await {
            Ok(records) => {
                tracing::info!(
                    scraper = scraper.name(),
                    business_type,
                    location,
                    count = records.len(),
                    "competitor scrape complete"
                );
                records
            }
            Err(e) => {
                tracing::warn!(
                    scraper = scraper.name(),
                    business_type,
                    location,
                    error = %e,
                    "competitor scrape failed; continuing without scraped data"
                );
                Vec::new()
            }
        }
    }
}
