//! Chain detection within one query's result set.
//!
//! Records are grouped by canonical brand key, then groups whose keys are
//! near-identical are merged, provided the two groups are not just the same
//! storefront listed twice. Only clusters with at least two physically
//! distinct members are reported.

use std::collections::HashMap;

use serde::Serialize;
use sitewise_core::{BusinessRecord, ChainDetectionConfig};

use crate::normalize::normalize_with_tokens;

/// A record that sits within the separation distance of a cluster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicateListing {
    pub index: usize,
    pub duplicate_of: usize,
}

/// Records judged to be one brand at several locations.
///
/// `members` and `duplicate_listings` hold indices into the slice passed to
/// [`detect`]. Members are pairwise at least `min_separation_km` apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainCluster {
    /// Most frequent literal name among the cluster's records.
    pub name: String,
    pub brand_key: String,
    pub members: Vec<usize>,
    pub duplicate_listings: Vec<DuplicateListing>,
}

impl ChainCluster {
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the record at `index` belongs to this cluster, either as a
    /// member or as a duplicate listing of one.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index) || self.duplicate_listings.iter().any(|d| d.index == index)
    }
}

struct KeyGroup {
    key: String,
    /// Record indices in input order.
    records: Vec<usize>,
}

/// Detects chains in `records`.
///
/// Clusters are returned in order of their first record's position.
#[must_use]
pub fn detect(records: &[BusinessRecord], config: &ChainDetectionConfig) -> Vec<ChainCluster> {
    let groups = group_by_key(records, config.brand_key_tokens);
    let n = groups.len();
    if n == 0 {
        return Vec::new();
    }

    // Symmetric, so each unordered pair is scored once.
    let mut similarity = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let score = strsim::normalized_levenshtein(&groups[i].key, &groups[j].key);
            similarity[i][j] = score;
            similarity[j][i] = score;
        }
    }

    let mut assigned = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut merged = vec![seed];
        let mut frontier = vec![seed];
        while let Some(current) = frontier.pop() {
            for other in 0..n {
                if assigned[other] || similarity[current][other] < config.similarity_threshold {
                    continue;
                }
                if has_distinct_location(
                    &groups[current],
                    &groups[other],
                    records,
                    config.min_separation_km,
                ) {
                    assigned[other] = true;
                    merged.push(other);
                    frontier.push(other);
                }
            }
        }

        let mut indices: Vec<usize> = merged
            .iter()
            .flat_map(|&g| groups[g].records.iter().copied())
            .collect();
        indices.sort_unstable();

        let (members, duplicate_listings) =
            collapse_duplicates(&indices, records, config.min_separation_km);
        if members.len() < 2 {
            continue;
        }

        clusters.push(ChainCluster {
            name: most_frequent_name(&indices, records),
            brand_key: groups[seed].key.clone(),
            members,
            duplicate_listings,
        });
    }

    if !clusters.is_empty() {
        tracing::debug!(
            records = records.len(),
            clusters = clusters.len(),
            "result-set chains detected"
        );
    }

    clusters
}

fn group_by_key(records: &[BusinessRecord], key_tokens: usize) -> Vec<KeyGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<KeyGroup> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let key = normalize_with_tokens(&record.name, key_tokens);
        if key.is_empty() {
            continue;
        }
        match positions.get(&key) {
            Some(&position) => groups[position].records.push(index),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(KeyGroup {
                    key,
                    records: vec![index],
                });
            }
        }
    }

    groups
}

/// True when some record of `a` is at least `min_km` from some record of `b`.
fn has_distinct_location(
    a: &KeyGroup,
    b: &KeyGroup,
    records: &[BusinessRecord],
    min_km: f64,
) -> bool {
    a.records.iter().any(|&i| {
        b.records
            .iter()
            .any(|&j| records[i].coordinates.distance_km(&records[j].coordinates) >= min_km)
    })
}

/// Splits `indices` into members that are pairwise `min_km` apart and
/// listings that fall within `min_km` of an earlier member.
fn collapse_duplicates(
    indices: &[usize],
    records: &[BusinessRecord],
    min_km: f64,
) -> (Vec<usize>, Vec<DuplicateListing>) {
    let mut members: Vec<usize> = Vec::new();
    let mut duplicates = Vec::new();

    for &index in indices {
        let here = &records[index].coordinates;
        let near = members
            .iter()
            .copied()
            .find(|&m| records[m].coordinates.distance_km(here) < min_km);
        match near {
            Some(member) => duplicates.push(DuplicateListing {
                index,
                duplicate_of: member,
            }),
            None => members.push(index),
        }
    }

    (members, duplicates)
}

/// Most frequent literal name; ties go to the name seen first.
fn most_frequent_name(indices: &[usize], records: &[BusinessRecord]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &index in indices {
        let name = records[index].name.as_str();
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None::<(&str, usize)>, |best, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;
