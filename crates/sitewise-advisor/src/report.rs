//! Final report assembly and Markdown rendering.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sitewise_core::{BusinessRecord, Coordinates};
use sitewise_scraper::ScrapedRecord;
use sitewise_sentiment::{top_reviews, MarketSentiment, SentimentSummary, TopReviews};
use uuid::Uuid;

use crate::intent::{Intent, QueryKind};
use crate::recommend::{MarketBrief, Recommendation};
use crate::types::{
    Amenities, ChainReport, CoordinateSource, DegradedStep, NearbyPlace, ScrapedData,
    SiteLocation,
};

pub const TOP_COMPETITORS: usize = 3;
pub const AMENITIES_PER_TYPE: usize = 5;
const REVIEWS_PER_COMPETITOR: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDetails {
    pub coordinates: Coordinates,
    pub coordinate_source: CoordinateSource,
    pub business_type: String,
    pub area_name: String,
    pub property_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOverview {
    pub competitor_count: usize,
    /// Mean over competitors that have a rating; `None` when none do.
    pub average_rating: Option<f64>,
    pub average_sentiment: f64,
    pub positive_sentiment_percentage: f64,
    pub negative_sentiment_percentage: f64,
    pub reviews_analyzed: usize,
}

impl MarketOverview {
    #[must_use]
    pub fn from_market(competitors: &[BusinessRecord], sentiment: &MarketSentiment) -> Self {
        let ratings: Vec<f64> = competitors.iter().filter_map(|b| b.rating).collect();
        #[allow(clippy::cast_precision_loss)]
        let average_rating = (!ratings.is_empty())
            .then(|| round_to(ratings.iter().sum::<f64>() / ratings.len() as f64, 2));

        Self {
            competitor_count: competitors.len(),
            average_rating,
            average_sentiment: round_to(sentiment.overall.average_compound, 2),
            positive_sentiment_percentage: round_to(sentiment.overall.positive_percentage, 1),
            negative_sentiment_percentage: round_to(sentiment.overall.negative_percentage, 1),
            reviews_analyzed: sentiment.overall.total_reviews,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorSummary {
    pub name: String,
    pub rating: f64,
    pub review_count: u32,
    pub address: Option<String>,
    pub distance_km: f64,
    pub sentiment: SentimentSummary,
    pub is_chain: bool,
    pub chain_name: Option<String>,
    pub total_locations: usize,
    pub reviews: TopReviews,
}

/// The best-rated competitors, highest first. Unrated businesses are left
/// out; ties keep search order.
#[must_use]
pub fn top_competitors(
    site: Coordinates,
    competitors: &[BusinessRecord],
    sentiment: &MarketSentiment,
    chains: &ChainReport,
    n: usize,
) -> Vec<CompetitorSummary> {
    let mut rated: Vec<(&BusinessRecord, f64)> = competitors
        .iter()
        .filter_map(|b| b.rating.map(|rating| (b, rating)))
        .collect();
    rated.sort_by(|a, b| b.1.total_cmp(&a.1));

    rated
        .into_iter()
        .take(n)
        .map(|(record, rating)| {
            let chain = chains.for_business(&record.name);
            CompetitorSummary {
                name: record.name.clone(),
                rating,
                review_count: record.review_count,
                address: record.address.clone(),
                distance_km: round_to(site.distance_km(&record.coordinates), 2),
                sentiment: sentiment
                    .per_business
                    .get(&record.name)
                    .cloned()
                    .unwrap_or_default(),
                is_chain: chain.is_some_and(|c| c.is_chain),
                chain_name: chain.and_then(|c| c.chain_name.clone()),
                total_locations: chain.map_or(1, |c| c.total_locations),
                reviews: top_reviews(&sentiment.scored, &record.name, REVIEWS_PER_COMPETITOR),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSection {
    /// Distinct chain brands among the competitors.
    pub chain_count: usize,
    /// Competitors that belong to a chain.
    pub chain_businesses: usize,
    pub independent_businesses: usize,
    pub chain_names: Vec<String>,
    pub report: ChainReport,
}

impl From<ChainReport> for ChainSection {
    fn from(report: ChainReport) -> Self {
        let chain_names = report.chain_names();
        let chain_businesses = report.chain_business_count();
        Self {
            chain_count: chain_names.len(),
            chain_businesses,
            independent_businesses: report.businesses.len() - chain_businesses,
            chain_names,
            report,
        }
    }
}

/// Everything the pipeline produced, ready to be assembled.
#[derive(Debug, Clone)]
pub struct ReportParts {
    pub intent: Intent,
    pub site: SiteLocation,
    pub amenities: Amenities,
    pub market_overview: MarketOverview,
    pub top_competitors: Vec<CompetitorSummary>,
    pub chains: ChainReport,
    pub scraped: ScrapedData,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    pub query_kind: QueryKind,
    pub property: PropertyDetails,
    pub market_overview: MarketOverview,
    pub top_competitors: Vec<CompetitorSummary>,
    pub chains: ChainSection,
    /// Closest places per amenity type.
    pub nearby_amenities: BTreeMap<String, Vec<NearbyPlace>>,
    pub scraped_items: usize,
    pub scraped: Vec<ScrapedRecord>,
    pub recommendation: Recommendation,
    pub degraded_steps: Vec<DegradedStep>,
}

impl AnalysisReport {
    #[must_use]
    pub fn build(parts: ReportParts, degraded_steps: Vec<DegradedStep>) -> Self {
        let ReportParts {
            intent,
            site,
            amenities,
            market_overview,
            top_competitors,
            chains,
            scraped,
            recommendation,
        } = parts;

        let nearby_amenities = amenities
            .by_type
            .into_iter()
            .map(|(kind, mut places)| {
                places.truncate(AMENITIES_PER_TYPE);
                (kind, places)
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            query: intent.query,
            query_kind: intent.kind,
            property: PropertyDetails {
                coordinates: site.coordinates,
                coordinate_source: site.coordinate_source,
                business_type: intent.business_type,
                area_name: site.area.area_name,
                property_name: site.property_name,
            },
            market_overview,
            top_competitors,
            chains: ChainSection::from(chains),
            nearby_amenities,
            scraped_items: scraped.records.len(),
            scraped: scraped.records,
            recommendation,
            degraded_steps,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded_steps.is_empty()
    }
}

/// Condenses the market data into the recommendation prompt input.
#[must_use]
pub fn market_brief(
    business_type: &str,
    site: &SiteLocation,
    overview: &MarketOverview,
    top: &[CompetitorSummary],
    chains: &ChainReport,
    amenities: &Amenities,
    scraped: &ScrapedData,
) -> MarketBrief {
    let chain_names = chains.chain_names();
    MarketBrief {
        business_type: business_type.to_string(),
        area_name: site.display_name().to_string(),
        competitor_count: overview.competitor_count,
        average_rating: overview.average_rating,
        average_sentiment: overview.average_sentiment,
        positive_percentage: overview.positive_sentiment_percentage,
        negative_percentage: overview.negative_sentiment_percentage,
        chain_count: chain_names.len(),
        chain_names,
        top_competitors: top.iter().map(|c| c.name.clone()).collect(),
        amenity_counts: amenities
            .by_type
            .iter()
            .map(|(kind, places)| (kind.clone(), places.len()))
            .collect(),
        scraped_items: scraped.records.len(),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.property;
        writeln!(f, "# Site feasibility: {} in {}", p.business_type, p.area_name)?;
        writeln!(f)?;
        if !self.query.is_empty() {
            writeln!(f, "> {}", self.query)?;
            writeln!(f)?;
        }
        writeln!(
            f,
            "- Location: {:.6}, {:.6} ({})",
            p.coordinates.latitude,
            p.coordinates.longitude,
            p.property_name.as_deref().unwrap_or("no named property")
        )?;
        writeln!(f, "- Query kind: {}", self.query_kind)?;
        writeln!(f, "- Run: {} at {}", self.run_id, self.generated_at.to_rfc3339())?;

        let m = &self.market_overview;
        writeln!(f, "\n## Market overview\n")?;
        writeln!(f, "- Competitors: {}", m.competitor_count)?;
        match m.average_rating {
            Some(rating) => writeln!(f, "- Average rating: {rating:.2}")?,
            None => writeln!(f, "- Average rating: n/a")?,
        }
        writeln!(
            f,
            "- Review sentiment: {:.2} over {} reviews ({:.1}% positive, {:.1}% negative)",
            m.average_sentiment,
            m.reviews_analyzed,
            m.positive_sentiment_percentage,
            m.negative_sentiment_percentage
        )?;

        writeln!(f, "\n## Top competitors\n")?;
        if self.top_competitors.is_empty() {
            writeln!(f, "No rated competitors found.")?;
        }
        for (i, c) in self.top_competitors.iter().enumerate() {
            let chain = match &c.chain_name {
                Some(name) if c.is_chain => {
                    format!(", chain: {name} ({} locations)", c.total_locations)
                }
                _ => String::new(),
            };
            writeln!(
                f,
                "{}. **{}** {:.1} stars, {} reviews, {:.2} km away{chain}",
                i + 1,
                c.name,
                c.rating,
                c.review_count,
                c.distance_km
            )?;
            if c.sentiment.total_reviews > 0 {
                writeln!(
                    f,
                    "   - Sentiment {:.2} ({:.1}% positive)",
                    c.sentiment.average_compound, c.sentiment.positive_percentage
                )?;
            }
            for review in &c.reviews.most_positive {
                writeln!(f, "   - + \"{}\"", review.review.text)?;
            }
            for review in &c.reviews.most_negative {
                writeln!(f, "   - - \"{}\"", review.review.text)?;
            }
        }

        let chains = &self.chains;
        writeln!(f, "\n## Chains\n")?;
        writeln!(
            f,
            "{} chain brands across {} competitors; {} independents.",
            chains.chain_count, chains.chain_businesses, chains.independent_businesses
        )?;
        for name in &chains.chain_names {
            writeln!(f, "- {name}")?;
        }

        if self.nearby_amenities.values().any(|places| !places.is_empty()) {
            writeln!(f, "\n## Nearby amenities")?;
            for (kind, places) in &self.nearby_amenities {
                if places.is_empty() {
                    continue;
                }
                writeln!(f, "\n### {kind}\n")?;
                for (i, place) in places.iter().enumerate() {
                    let rating = place
                        .record
                        .rating
                        .map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}"));
                    writeln!(
                        f,
                        "{}. **{}** ({:.2} km away), rating {rating}",
                        i + 1,
                        place.record.name,
                        place.distance_km
                    )?;
                }
            }
        }

        if self.scraped_items > 0 {
            writeln!(f, "\n## Directory listings\n")?;
            writeln!(f, "{} listings scraped.", self.scraped_items)?;
        }

        let r = &self.recommendation;
        writeln!(f, "\n## Recommendation\n")?;
        writeln!(f, "{}", r.recommendation)?;
        for (title, items) in [
            ("Pros", &r.pros),
            ("Cons", &r.cons),
            ("Suggestions", &r.suggestions),
        ] {
            writeln!(f, "\n### {title}\n")?;
            for item in items {
                writeln!(f, "- {item}")?;
            }
        }

        if self.is_degraded() {
            writeln!(f, "\n## Degraded steps\n")?;
            for step in &self.degraded_steps {
                writeln!(f, "- {}: {}", step.step, step.reason)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
