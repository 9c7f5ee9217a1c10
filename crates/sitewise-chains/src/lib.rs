//! Chain and brand detection.
//!
//! Three independent signals decide whether a business is part of a chain:
//! the city-wide index ([`CityChainIndex`]), clustering within the current
//! result set ([`detect`]), and a model judgment ([`BrandClassifier`]).
//! [`merge`] combines them per record.

pub mod city_index;
pub mod classifier;
pub mod detector;
pub mod error;
pub mod merge;
pub mod normalize;

pub use city_index::{ChainStatistics, ChainSummary, CityChainIndex, CityChainMatch};
pub use classifier::{classify_all, BrandClassifier, LlmBrandClassifier};
pub use detector::{detect, ChainCluster, DuplicateListing};
pub use error::ChainError;
pub use merge::{enrich_all, merge, ClusterMembership, EnrichedBusiness};
pub use normalize::{display_brand, normalize, normalize_with_tokens, DEFAULT_KEY_TOKENS};
