//! City-wide chain index.
//!
//! Built once from a pre-collected list of every business in the city. Any
//! brand key that occurs at least twice in the list is a local chain. The
//! index is never updated after construction; the backing list is refreshed
//! out of band.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sitewise_core::{CityBusiness, Coordinates};

use crate::error::ChainError;
use crate::normalize::{display_brand, normalize_with_tokens, DEFAULT_KEY_TOKENS};

/// Result of [`CityChainIndex::lookup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityChainMatch {
    pub is_chain: bool,
    /// Display form of the brand key; `None` when not a chain.
    pub brand: Option<String>,
    /// Number of city-wide locations; 0 when not a chain.
    pub location_count: usize,
    pub locations: Vec<CityBusiness>,
}

impl CityChainMatch {
    #[must_use]
    pub fn not_a_chain() -> Self {
        Self {
            is_chain: false,
            brand: None,
            location_count: 0,
            locations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary {
    pub brand: String,
    pub locations: usize,
    pub sample_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStatistics {
    pub total_chains: usize,
    pub businesses_indexed: usize,
    /// Location count -> number of chains with that many locations.
    pub location_distribution: BTreeMap<usize, usize>,
    pub top_chains: Vec<ChainSummary>,
}

/// One CSV row. Column names follow the collector's output (`lat`, `lon`,
/// `types`), with the long forms accepted as aliases.
#[derive(Debug, Deserialize)]
struct CityRow {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "latitude", deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude", deserialize_with = "csv::invalid_option")]
    lon: Option<f64>,
    #[serde(default)]
    address: String,
    #[serde(default, alias = "category")]
    types: String,
}

impl CityRow {
    fn into_business(self) -> Option<CityBusiness> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(CityBusiness {
            name: name.to_string(),
            coordinates: Coordinates::new(self.lat?, self.lon?),
            address: self.address,
            category: self.types,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CityChainIndex {
    chains: HashMap<String, Vec<CityBusiness>>,
    key_tokens: usize,
    businesses_indexed: usize,
}

impl CityChainIndex {
    /// An index that reports every name as not-a-chain.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            chains: HashMap::new(),
            key_tokens: DEFAULT_KEY_TOKENS,
            businesses_indexed: 0,
        }
    }

    /// Builds the index, keeping only brand keys seen two or more times.
    #[must_use]
    pub fn from_businesses<I>(businesses: I, key_tokens: usize) -> Self
    where
        I: IntoIterator<Item = CityBusiness>,
    {
        let mut groups: HashMap<String, Vec<CityBusiness>> = HashMap::new();
        let mut businesses_indexed = 0;

        for business in businesses {
            let key = normalize_with_tokens(&business.name, key_tokens);
            if key.is_empty() {
                continue;
            }
            businesses_indexed += 1;
            groups.entry(key).or_default().push(business);
        }

        groups.retain(|_, locations| locations.len() >= 2);

        tracing::info!(
            businesses = businesses_indexed,
            chains = groups.len(),
            "city chain index built"
        );

        Self {
            chains: groups,
            key_tokens,
            businesses_indexed,
        }
    }

    /// Loads the city business list from a CSV file.
    ///
    /// Rows without a name or with unparseable coordinates are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::CityList`] if the file cannot be opened or its
    /// header read, and [`ChainError::MissingColumn`] if it has no `name`
    /// column.
    pub fn load_csv(path: &Path, key_tokens: usize) -> Result<Self, ChainError> {
        let path_display = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ChainError::CityList {
                path: path_display.clone(),
                source: e,
            })?;

        let headers = reader.headers().map_err(|e| ChainError::CityList {
            path: path_display.clone(),
            source: e,
        })?;
        if !headers.iter().any(|h| h == "name") {
            return Err(ChainError::MissingColumn {
                path: path_display,
                column: "name",
            });
        }

        let mut businesses = Vec::new();
        let mut skipped = 0_usize;
        for row in reader.deserialize::<CityRow>() {
            match row.ok().and_then(CityRow::into_business) {
                Some(business) => businesses.push(business),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(path = %path_display, skipped, "skipped malformed city list rows");
        }

        Ok(Self::from_businesses(businesses, key_tokens))
    }

    /// Like [`CityChainIndex::load_csv`], but a missing or unreadable list
    /// yields an empty index with a warning.
    #[must_use]
    pub fn load_or_empty(path: &Path, key_tokens: usize) -> Self {
        match Self::load_csv(path, key_tokens) {
            Ok(index) => {
                if index.businesses_indexed == 0 {
                    tracing::warn!(path = %path.display(), "city business list is empty");
                }
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "city chain index unavailable, continuing without it");
                Self {
                    key_tokens,
                    ..Self::empty()
                }
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> CityChainMatch {
        let key = normalize_with_tokens(name, self.key_tokens);
        if key.is_empty() {
            return CityChainMatch::not_a_chain();
        }

        match self.chains.get(&key) {
            Some(locations) => CityChainMatch {
                is_chain: true,
                brand: Some(display_brand(&key)),
                location_count: locations.len(),
                locations: locations.clone(),
            },
            None => CityChainMatch::not_a_chain(),
        }
    }

    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Summary of the index: how many chains, how large, and the biggest
    /// `top_n` with up to three sample addresses each.
    #[must_use]
    pub fn statistics(&self, top_n: usize) -> ChainStatistics {
        let mut location_distribution = BTreeMap::new();
        for locations in self.chains.values() {
            *location_distribution.entry(locations.len()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&String, &Vec<CityBusiness>)> = self.chains.iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

        let top_chains = ranked
            .into_iter()
            .take(top_n)
            .map(|(key, locations)| ChainSummary {
                brand: display_brand(key),
                locations: locations.len(),
                sample_addresses: locations
                    .iter()
                    .take(3)
                    .map(|l| l.address.clone())
                    .collect(),
            })
            .collect();

        ChainStatistics {
            total_chains: self.chains.len(),
            businesses_indexed: self.businesses_indexed,
            location_distribution,
            top_chains,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn business(name: &str, lat: f64, lon: f64, address: &str) -> CityBusiness {
        CityBusiness {
            name: name.to_string(),
            coordinates: Coordinates::new(lat, lon),
            address: address.to_string(),
            category: "cafe".to_string(),
        }
    }

    fn sample_index() -> CityChainIndex {
        CityChainIndex::from_businesses(
            vec![
                business("Sharma Cafe - Sector 12", 30.70, 76.70, "SCO 1, Sector 12"),
                business("Sharma's Cafe #3", 30.75, 76.78, "SCO 9, Sector 35"),
                business("Sharma Cafe, Phase 7", 30.71, 76.72, "Phase 7"),
                business("Brew Bros", 30.72, 76.73, "Phase 3B2"),
                business("Brew Bros", 30.66, 76.80, "Zirakpur"),
                business("Lone Bakery", 30.68, 76.69, "Sector 70"),
            ],
            DEFAULT_KEY_TOKENS,
        )
    }

    #[test]
    fn single_occurrence_is_not_a_chain() {
        let index = sample_index();
        let m = index.lookup("Lone Bakery");
        assert!(!m.is_chain);
        assert!(m.brand.is_none());
        assert_eq!(m.location_count, 0);
    }

    #[test]
    fn two_or_more_occurrences_are_a_chain() {
        let index = sample_index();

        let m = index.lookup("Brew Bros - Mohali");
        assert!(m.is_chain);
        assert_eq!(m.brand.as_deref(), Some("Brew Bros"));
        assert_eq!(m.location_count, 2);

        let m = index.lookup("Sharma Cafe");
        assert_eq!(m.location_count, 3);
        assert_eq!(m.locations.len(), 3);
    }

    #[test]
    fn co_located_occurrences_still_count() {
        let index = CityChainIndex::from_businesses(
            vec![
                business("Twin Cafe", 30.70, 76.70, "A"),
                business("Twin Cafe", 30.70, 76.70, "A"),
            ],
            DEFAULT_KEY_TOKENS,
        );
        assert!(index.lookup("Twin Cafe").is_chain);
    }

    #[test]
    fn empty_index_reports_not_a_chain() {
        let index = CityChainIndex::empty();
        assert!(index.is_empty());
        assert!(!index.lookup("Sharma Cafe").is_chain);
        assert!(!index.lookup("").is_chain);
    }

    #[test]
    fn statistics_rank_chains_by_location_count() {
        let stats = sample_index().statistics(10);
        assert_eq!(stats.total_chains, 2);
        assert_eq!(stats.businesses_indexed, 6);
        assert_eq!(stats.location_distribution.get(&2), Some(&1));
        assert_eq!(stats.location_distribution.get(&3), Some(&1));
        assert_eq!(stats.top_chains[0].brand, "Sharma Cafe");
        assert_eq!(stats.top_chains[0].locations, 3);
        assert_eq!(stats.top_chains[0].sample_addresses.len(), 3);
        assert_eq!(stats.top_chains[1].brand, "Brew Bros");

        let top_one = sample_index().statistics(1);
        assert_eq!(top_one.top_chains.len(), 1);
    }

    #[test]
    fn loads_csv_and_skips_malformed_rows() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "name,lat,lon,address,types\n\
             Brew Bros,30.72,76.73,Phase 3B2,cafe\n\
             Brew Bros - Zirakpur,30.66,76.80,Zirakpur,cafe\n\
             ,30.1,76.1,nameless,cafe\n\
             Broken Coords,north,76.1,somewhere,cafe\n\
             Lone Bakery,30.68,76.69,Sector 70,bakery"
        )
        .expect("write csv");

        let index = CityChainIndex::load_csv(file.path(), DEFAULT_KEY_TOKENS).expect("load");
        assert_eq!(index.chain_count(), 1);
        let m = index.lookup("Brew Bros");
        assert!(m.is_chain);
        assert_eq!(m.locations[1].address, "Zirakpur");
        assert_eq!(m.locations[0].category, "cafe");
        assert_eq!(index.statistics(5).businesses_indexed, 3);
    }

    #[test]
    fn loads_csv_with_long_column_names() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "name,latitude,longitude,address,category\n\
             Gopal Sweets,30.70,76.70,Sector 8,sweets\n\
             Gopal Sweets SCF 23,30.74,76.78,Sector 17,sweets"
        )
        .expect("write csv");

        let index = CityChainIndex::load_csv(file.path(), DEFAULT_KEY_TOKENS).expect("load");
        let m = index.lookup("Gopal Sweets");
        assert!(m.is_chain);
        assert_eq!(m.locations[0].category, "sweets");
    }

    #[test]
    fn csv_without_name_column_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "title,lat,lon\nA,1,2").expect("write csv");
        let result = CityChainIndex::load_csv(file.path(), DEFAULT_KEY_TOKENS);
        assert!(matches!(result, Err(ChainError::MissingColumn { .. })));
    }

    #[test]
    fn missing_file_degrades_to_empty_index() {
        let index = CityChainIndex::load_or_empty(
            Path::new("/definitely/not/here/city_businesses.csv"),
            DEFAULT_KEY_TOKENS,
        );
        assert!(index.is_empty());
        assert!(!index.lookup("Brew Bros").is_chain);
    }
}
