use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use sitewise_chains::{detect, CityChainIndex};
use sitewise_core::{AppConfig, BusinessRecord};

/// Sub-commands available under `chains`.
#[derive(Debug, Subcommand)]
pub enum ChainsCommands {
    /// Summarise the chains found in the city business list
    Stats {
        /// Number of largest chains to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Run chain detection over a saved JSON array of business records
    Detect { path: PathBuf },
}

/// Print city-list chain statistics.
///
/// # Errors
///
/// Returns an error if the city business list cannot be read.
pub(crate) fn run_chains_stats(config: &AppConfig, top: usize) -> anyhow::Result<()> {
    let index = CityChainIndex::load_csv(
        &config.city_businesses_path,
        config.chain_detection.brand_key_tokens,
    )
    .with_context(|| {
        format!(
            "failed to load city business list {}",
            config.city_businesses_path.display()
        )
    })?;
    let stats = index.statistics(top);

    println!(
        "{} chains across {} indexed businesses",
        stats.total_chains, stats.businesses_indexed
    );
    if stats.top_chains.is_empty() {
        return Ok(());
    }

    println!();
    println!("{:<32}{:<11}SAMPLE ADDRESS", "BRAND", "LOCATIONS");
    for chain in &stats.top_chains {
        let sample = chain
            .sample_addresses
            .iter()
            .find(|a| !a.trim().is_empty())
            .map_or("-", String::as_str);
        println!("{:<32}{:<11}{}", chain.brand, chain.locations, sample);
    }

    println!();
    println!("{:<11}CHAINS", "LOCATIONS");
    for (locations, chains) in &stats.location_distribution {
        println!("{locations:<11}{chains}");
    }
    Ok(())
}

/// Detect chains in a saved result set and print each cluster.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// business records.
pub(crate) fn run_chains_detect(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let records = load_records(path)?;
    let clusters = detect(&records, &config.chain_detection);
    tracing::info!(
        records = records.len(),
        clusters = clusters.len(),
        "chain detection complete"
    );

    if clusters.is_empty() {
        println!("no chains among {} records", records.len());
        return Ok(());
    }

    for cluster in &clusters {
        println!(
            "{} ({} locations, key '{}')",
            cluster.name,
            cluster.member_count(),
            cluster.brand_key
        );
        for &index in &cluster.members {
            let record = &records[index];
            println!(
                "  - {} @ {:.5},{:.5}",
                record.name, record.coordinates.latitude, record.coordinates.longitude
            );
        }
        for duplicate in &cluster.duplicate_listings {
            println!(
                "  ~ {} duplicates {}",
                records[duplicate.index].name, records[duplicate.duplicate_of].name
            );
        }
    }
    Ok(())
}

fn load_records(path: &Path) -> anyhow::Result<Vec<BusinessRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of business records", path.display()))
}
