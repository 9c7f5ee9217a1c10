//! Inputs and outputs passed between pipeline steps.

use std::collections::BTreeMap;

use serde::Serialize;
use sitewise_chains::{ChainCluster, EnrichedBusiness};
use sitewise_core::{BusinessRecord, Coordinates, Review};
use sitewise_places::AreaInfo;
use sitewise_scraper::ScrapedRecord;

/// How the site coordinates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSource {
    PropertyCatalog,
    Geocoder,
    Default,
}

/// The analysed site: where it is and what the area is called.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteLocation {
    pub coordinates: Coordinates,
    pub coordinate_source: CoordinateSource,
    pub property_name: Option<String>,
    pub area: AreaInfo,
}

impl SiteLocation {
    #[must_use]
    pub fn area_name(&self) -> &str {
        &self.area.area_name
    }

    /// Text naming the site, for scrapers and prompts.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.property_name
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&self.area.area_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlace {
    #[serde(flatten)]
    pub record: BusinessRecord,
    pub distance_km: f64,
}

/// Amenity type -> nearby places, closest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Amenities {
    pub by_type: BTreeMap<String, Vec<NearbyPlace>>,
}

impl Amenities {
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Competitors {
    pub records: Vec<BusinessRecord>,
    /// True when the places API failed and the records came from the cache.
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewSet {
    pub reviews: Vec<Review>,
    pub businesses_queried: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChainReport {
    pub businesses: Vec<EnrichedBusiness>,
    pub clusters: Vec<ChainCluster>,
}

impl ChainReport {
    /// Distinct chain names among the enriched businesses, in first-seen order.
    #[must_use]
    pub fn chain_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.businesses.iter().filter_map(|b| b.chain_name.as_ref()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    #[must_use]
    pub fn chain_business_count(&self) -> usize {
        self.businesses.iter().filter(|b| b.is_chain).count()
    }

    #[must_use]
    pub fn for_business(&self, name: &str) -> Option<&EnrichedBusiness> {
        self.businesses.iter().find(|b| b.record.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapedData {
    pub records: Vec<ScrapedRecord>,
}

/// A step that substituted a safe default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedStep {
    pub step: String,
    pub reason: String,
}
