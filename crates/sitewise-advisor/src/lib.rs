//! Site-feasibility advisor: turns a free-text question such as "should I
//! open a cafe near The Zirk?" into a market report.
//!
//! The pipeline runs fixed steps in order (intent, location, amenities,
//! competitors, reviews, sentiment, chains, scraping, recommendation) and
//! never fails once built; see [`Advisor::run`].

pub mod error;
pub mod intent;
pub mod pipeline;
pub mod properties;
pub mod recommend;
pub mod report;
pub mod types;

pub use error::AdvisorError;
pub use intent::{Intent, QueryKind};
pub use pipeline::Advisor;
pub use properties::{Property, PropertyCatalog};
pub use recommend::Recommendation;
pub use report::{AnalysisReport, CompetitorSummary, MarketOverview};
pub use types::{
    Amenities, ChainReport, Competitors, CoordinateSource, DegradedStep, NearbyPlace, ReviewSet,
    ScrapedData, SiteLocation,
};
