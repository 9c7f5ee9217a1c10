use thiserror::Error;

/// Errors that stop the advisor from being built.
///
/// Once an [`crate::Advisor`] exists, a run never fails: collaborator
/// problems surface as degraded steps in the report instead.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("configuration error: {0}")]
    Config(#[from] sitewise_core::ConfigError),

    #[error("places client error: {0}")]
    Places(#[from] sitewise_places::PlacesError),

    #[error("LLM client error: {0}")]
    Llm(#[from] sitewise_llm::LlmError),

    #[error("scraper error: {0}")]
    Scraper(#[from] sitewise_scraper::ScraperError),

    #[error("cache error: {0}")]
    Db(#[from] sitewise_db::DbError),

    /// The property catalog exists but could not be read.
    #[error("failed to read property catalog {path}: {source}")]
    Properties {
        path: String,
        #[source]
        source: csv::Error,
    },
}
