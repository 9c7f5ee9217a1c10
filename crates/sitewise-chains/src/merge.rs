//! Combines city-index, result-cluster, and model evidence per business.

use serde::Serialize;
use sitewise_core::{BrandClassification, BusinessRecord, ClassificationSource, Outcome};

use crate::city_index::{CityChainIndex, CityChainMatch};
use crate::detector::ChainCluster;

/// Whether one record belongs to a result-set chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMembership {
    pub is_member: bool,
    pub chain_name: Option<String>,
    /// Distinct locations in the cluster; 0 when not a member.
    pub member_count: usize,
}

impl ClusterMembership {
    #[must_use]
    pub fn none() -> Self {
        Self {
            is_member: false,
            chain_name: None,
            member_count: 0,
        }
    }

    /// Membership of the record at `index` in the detector's output.
    #[must_use]
    pub fn for_record(clusters: &[ChainCluster], index: usize) -> Self {
        clusters
            .iter()
            .find(|c| c.contains(index))
            .map_or_else(Self::none, |c| Self {
                is_member: true,
                chain_name: Some(c.name.clone()),
                member_count: c.member_count(),
            })
    }
}

/// A business record with its chain verdict attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBusiness {
    #[serde(flatten)]
    pub record: BusinessRecord,
    pub is_chain: bool,
    pub chain_name: Option<String>,
    /// City-index locations plus result-set members. A branch present in
    /// both sources is counted twice.
    pub total_locations: usize,
    pub classification: BrandClassification,
    /// The attached classification is the model fallback, not a real answer.
    pub classification_degraded: bool,
}

/// Merges the three chain signals for one record.
///
/// Any source can mark the record as a chain. Deterministic sources win
/// over the model when choosing the name and the attached classification.
#[must_use]
pub fn merge(
    record: BusinessRecord,
    city: &CityChainMatch,
    cluster: &ClusterMembership,
    llm: &Outcome<BrandClassification>,
) -> EnrichedBusiness {
    let judgment = llm.value();
    let is_chain = city.is_chain || cluster.is_member || judgment.is_branded;

    let chain_name = is_chain.then(|| {
        city.brand
            .clone()
            .or_else(|| cluster.chain_name.clone())
            .unwrap_or_else(|| {
                if judgment.brand_name.trim().is_empty() {
                    record.name.clone()
                } else {
                    judgment.brand_name.clone()
                }
            })
    });

    let total_locations = (city.location_count + cluster.member_count).max(1);

    let (classification, classification_degraded) = if city.is_chain {
        (
            BrandClassification {
                is_branded: true,
                brand_name: city.brand.clone().unwrap_or_else(|| record.name.clone()),
                confidence: 1.0,
                reasoning: format!(
                    "{} locations in the city business list",
                    city.location_count
                ),
                source: ClassificationSource::CityIndex,
            },
            false,
        )
    } else if cluster.is_member {
        (
            BrandClassification {
                is_branded: true,
                brand_name: cluster
                    .chain_name
                    .clone()
                    .unwrap_or_else(|| record.name.clone()),
                confidence: 1.0,
                reasoning: format!("{} locations in these search results", cluster.member_count),
                source: ClassificationSource::ResultCluster,
            },
            false,
        )
    } else {
        (judgment.clone(), llm.is_degraded())
    };

    EnrichedBusiness {
        record,
        is_chain,
        chain_name,
        total_locations,
        classification,
        classification_degraded,
    }
}

/// Enriches every record in order; no record is dropped.
///
/// `classifications` is expected to line up with `records`; a missing entry
/// is treated as a degraded model answer.
#[must_use]
pub fn enrich_all(
    records: Vec<BusinessRecord>,
    city_index: &CityChainIndex,
    clusters: &[ChainCluster],
    classifications: Vec<Outcome<BrandClassification>>,
) -> Vec<EnrichedBusiness> {
    let mut classifications = classifications.into_iter();

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let llm = classifications.next().unwrap_or_else(|| {
                Outcome::degraded(
                    BrandClassification::fallback(&record.name),
                    "no classification available",
                )
            });
            let city = city_index.lookup(&record.name);
            let cluster = ClusterMembership::for_record(clusters, index);
            merge(record, &city, &cluster, &llm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sitewise_core::{ChainDetectionConfig, CityBusiness, Coordinates};

    use super::*;
    use crate::detector::detect;
    use crate::normalize::DEFAULT_KEY_TOKENS;

    fn record(name: &str, lat: f64, lon: f64) -> BusinessRecord {
        BusinessRecord::new(name, Coordinates::new(lat, lon))
    }

    fn city_chain(brand: &str, count: usize) -> CityChainMatch {
        CityChainMatch {
            is_chain: true,
            brand: Some(brand.to_string()),
            location_count: count,
            locations: Vec::new(),
        }
    }

    fn cluster_member(name: &str, count: usize) -> ClusterMembership {
        ClusterMembership {
            is_member: true,
            chain_name: Some(name.to_string()),
            member_count: count,
        }
    }

    fn llm(is_branded: bool, brand: &str) -> Outcome<BrandClassification> {
        Outcome::Complete(BrandClassification {
            is_branded,
            brand_name: brand.to_string(),
            confidence: 0.8,
            reasoning: "model".to_string(),
            source: ClassificationSource::LlmJudgment,
        })
    }

    #[test]
    fn independent_business_has_one_location() {
        let merged = merge(
            record("Lone Bakery", 30.7, 76.7),
            &CityChainMatch::not_a_chain(),
            &ClusterMembership::none(),
            &llm(false, "Lone Bakery"),
        );
        assert!(!merged.is_chain);
        assert!(merged.chain_name.is_none());
        assert_eq!(merged.total_locations, 1);
        assert_eq!(merged.classification.source, ClassificationSource::LlmJudgment);
        assert!(!merged.classification_degraded);
    }

    #[test]
    fn city_index_name_wins() {
        let merged = merge(
            record("Sharma Cafe - Sector 12", 30.7, 76.7),
            &city_chain("Sharma Cafe", 3),
            &cluster_member("Sharma Cafe - Sector 12", 2),
            &llm(true, "Sharma Group"),
        );
        assert!(merged.is_chain);
        assert_eq!(merged.chain_name.as_deref(), Some("Sharma Cafe"));
        assert_eq!(merged.total_locations, 5);
        assert_eq!(merged.classification.source, ClassificationSource::CityIndex);
        assert!((merged.classification.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cluster_name_is_used_without_city_match() {
        let merged = merge(
            record("CCD, Sector 9", 30.7, 76.75),
            &CityChainMatch::not_a_chain(),
            &cluster_member("CCD - Sector 17", 2),
            &llm(false, "CCD"),
        );
        assert!(merged.is_chain);
        assert_eq!(merged.chain_name.as_deref(), Some("CCD - Sector 17"));
        assert_eq!(merged.total_locations, 2);
        assert_eq!(merged.classification.source, ClassificationSource::ResultCluster);
    }

    #[test]
    fn model_alone_can_mark_a_chain() {
        let merged = merge(
            record("Starbucks Elante", 30.7, 76.8),
            &CityChainMatch::not_a_chain(),
            &ClusterMembership::none(),
            &llm(true, "Starbucks"),
        );
        assert!(merged.is_chain);
        assert_eq!(merged.chain_name.as_deref(), Some("Starbucks"));
        assert_eq!(merged.total_locations, 1);
    }

    #[test]
    fn blank_model_brand_uses_record_name() {
        let merged = merge(
            record("Starbucks Elante", 30.7, 76.8),
            &CityChainMatch::not_a_chain(),
            &ClusterMembership::none(),
            &llm(true, "  "),
        );
        assert_eq!(merged.chain_name.as_deref(), Some("Starbucks Elante"));
    }

    #[test]
    fn degraded_model_answer_is_flagged_with_half_confidence() {
        let degraded = Outcome::degraded(BrandClassification::fallback("Joe's Diner"), "timeout");
        let merged = merge(
            record("Joe's Diner", 30.74, 76.78),
            &CityChainMatch::not_a_chain(),
            &ClusterMembership::none(),
            &degraded,
        );
        assert!(!merged.is_chain);
        assert!(merged.classification_degraded);
        assert!((merged.classification.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn enrich_all_keeps_every_record_in_order() {
        let records = vec![
            record("CCD - Sector 17", 30.74, 76.78),
            record("Lone Bakery", 30.71, 76.71),
            record("CCD, Sector 9", 30.70, 76.75),
        ];
        let clusters = detect(&records, &ChainDetectionConfig::default());
        let city = CityChainIndex::from_businesses(
            vec![
                CityBusiness {
                    name: "Lone Bakery".to_string(),
                    coordinates: Coordinates::new(30.71, 76.71),
                    address: String::new(),
                    category: String::new(),
                },
            ],
            DEFAULT_KEY_TOKENS,
        );
        // One classification short: the last record gets the fallback.
        let classifications = vec![llm(false, "CCD"), llm(false, "Lone Bakery")];

        let enriched = enrich_all(records, &city, &clusters, classifications);

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].record.name, "CCD - Sector 17");
        assert!(enriched[0].is_chain);
        assert!(!enriched[1].is_chain);
        assert!(enriched[2].is_chain);
        assert_eq!(enriched[2].chain_name.as_deref(), Some("CCD - Sector 17"));
        // Cluster evidence outranks the missing model answer.
        assert!(!enriched[2].classification_degraded);
    }

    #[test]
    fn membership_covers_duplicate_listings() {
        let records = vec![
            record("CCD", 30.7400, 76.7800),
            record("CCD", 30.7401, 76.7801),
            record("CCD", 30.7000, 76.7500),
        ];
        let clusters = detect(&records, &ChainDetectionConfig::default());
        let membership = ClusterMembership::for_record(&clusters, 1);
        assert!(membership.is_member);
        assert_eq!(membership.member_count, 2);
        assert!(!ClusterMembership::for_record(&clusters, 7).is_member);
    }
}
