use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// The city business list could not be opened or its header read.
    #[error("failed to read city business list {path}: {source}")]
    CityList {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The city business list has no `name` column.
    #[error("city business list {path} has no '{column}' column")]
    MissingColumn { path: String, column: &'static str },
}
