//! Supplementary competitor data from third-party listing pages.
//!
//! Scraping is an optional enrichment: [`ScraperRegistry::scrape`] never
//! fails, it returns an empty list when no backend applies or a backend
//! errors.

pub mod directory;
pub mod error;
pub mod registry;
pub mod types;

mod jsonld;

use async_trait::async_trait;

pub use directory::JsonLdDirectoryScraper;
pub use error::ScraperError;
pub use registry::ScraperRegistry;
pub use types::ScrapedRecord;

/// A source of competitor listings for a business type in a location.
#[async_trait]
pub trait CompetitorScraper: Send + Sync {
    /// Short identifier used in logs and on produced records.
    fn name(&self) -> &str;

    fn supports(&self, business_type: &str) -> bool;

    /// # Errors
    ///
    /// Returns [`ScraperError`] on network failure, a non-2xx status, or
    /// when `business_type` is not supported.
    async fn scrape(
        &self,
        business_type: &str,
        location: &str,
    ) -> Result<Vec<ScrapedRecord>, ScraperError>;
}
