use thiserror::Error;

/// Errors returned by the places search and geocoding clients.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, including non-2xx statuses.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered 200 but reported an error in the body.
    #[error("places API error: {0}")]
    Api(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
