//! Shared domain types, configuration, and geometry for sitewise.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod geo;
pub mod outcome;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, ChainDetectionConfig};
pub use categories::{load_categories, load_categories_or_default, CategoryConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{haversine_km, BoundingBox, Coordinates};
pub use outcome::Outcome;
pub use types::{
    BrandClassification, BusinessRecord, CityBusiness, ClassificationSource, Review,
    FALLBACK_CLASSIFICATION_REASONING,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
