//! Maps search, reviews, and geocoding clients.

pub mod client;
pub mod error;
pub mod geocoder;
mod pacing;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use geocoder::Geocoder;
pub use types::{AreaInfo, GpsCoordinates, RawPlace, RawReview};
