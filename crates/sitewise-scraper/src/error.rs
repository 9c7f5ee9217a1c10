use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid listing URL template \"{template}\": {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("no listing URL configured for {business_type}")]
    Unsupported { business_type: String },
}
