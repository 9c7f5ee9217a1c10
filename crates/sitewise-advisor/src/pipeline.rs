//! The advisor: runs every analysis step in order and assembles the report.
//!
//! Steps never abort a run. A collaborator failure substitutes a safe
//! default, and the step is listed in [`AnalysisReport::degraded_steps`].

use std::time::Duration;

use sitewise_chains::{
    classify_all, detect, enrich_all, BrandClassifier, CityChainIndex, LlmBrandClassifier,
};
use sitewise_core::{
    load_categories_or_default, AppConfig, BoundingBox, BusinessRecord, CategoryConfig,
    ChainDetectionConfig, Coordinates, Outcome, Review,
};
use sitewise_db::{
    connect_pool, insert_reviews, list_places_in_bbox, list_reviews_for_business, run_migrations,
    upsert_places, PoolConfig,
};
use sitewise_llm::LlmClient;
use sitewise_places::{AreaInfo, Geocoder, PlacesClient};
use sitewise_scraper::ScraperRegistry;
use sitewise_sentiment::analyze_market;
use sqlx::SqlitePool;

use crate::error::AdvisorError;
use crate::intent::{extract_intent, Intent};
use crate::properties::PropertyCatalog;
use crate::recommend::recommend;
use crate::report::{
    market_brief, top_competitors, AnalysisReport, MarketOverview, ReportParts, TOP_COMPETITORS,
};
use crate::types::{
    Amenities, ChainReport, Competitors, CoordinateSource, DegradedStep, NearbyPlace, ReviewSet,
    ScrapedData, SiteLocation,
};

pub const AMENITY_RADIUS_M: u32 = 5_000;
pub const AMENITY_RESULTS_PER_TYPE: usize = 10;
pub const COMPETITOR_RADIUS_M: u32 = 3_000;
const COMPETITOR_RADIUS_KM: f64 = 3.0;
pub const REVIEWED_BUSINESSES: usize = 10;
pub const REVIEWS_PER_BUSINESS: usize = 20;

/// Nominatim's usage policy allows one request per second.
const GEOCODER_MIN_GAP: Duration = Duration::from_secs(1);

pub struct Advisor {
    categories: CategoryConfig,
    catalog: PropertyCatalog,
    city_index: CityChainIndex,
    places: PlacesClient,
    geocoder: Geocoder,
    llm: LlmClient,
    llm_timeout: Duration,
    classifier: Box<dyn BrandClassifier>,
    scrapers: ScraperRegistry,
    cache: Option<SqlitePool>,
    chain_detection: ChainDetectionConfig,
    classify_concurrency: usize,
    default_center: Coordinates,
}

impl Advisor {
    /// Builds every collaborator from configuration.
    ///
    /// Missing data files degrade to empty catalogs. A cache that cannot be
    /// opened is disabled with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError`] if the categories file is invalid or an HTTP
    /// client cannot be constructed.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AdvisorError> {
        let categories = load_categories_or_default(&config.categories_path)?;
        let catalog = PropertyCatalog::load_or_empty(&config.properties_path);
        let city_index = CityChainIndex::load_or_empty(
            &config.city_businesses_path,
            config.chain_detection.brand_key_tokens,
        );

        let places = PlacesClient::with_base_url(
            &config.serpapi_key,
            config.http_timeout_secs,
            Duration::from_millis(config.request_delay_ms),
            &config.serpapi_base_url,
            &config.user_agent,
        )?;
        let geocoder = Geocoder::with_base_url(
            &config.user_agent,
            config.http_timeout_secs,
            &config.geocoder_base_url,
            GEOCODER_MIN_GAP,
        )?;
        let llm = LlmClient::with_base_url(
            &config.llm_api_key,
            &config.llm_model,
            config.llm_timeout_secs,
            &config.llm_base_url,
            &config.user_agent,
        )?;
        let llm_timeout = Duration::from_secs(config.llm_timeout_secs);
        let classifier = Box::new(LlmBrandClassifier::new(llm.clone(), llm_timeout));
        let scrapers = ScraperRegistry::from_config(
            &categories,
            &config.user_agent,
            config.http_timeout_secs,
        )?;
        let cache = match config.cache_url.as_deref() {
            Some(url) => open_cache(url).await,
            None => None,
        };

        let default_center = catalog
            .first()
            .map_or(config.default_center, |p| p.coordinates);

        tracing::info!(
            properties = catalog.len(),
            city_chains = city_index.chain_count(),
            cache = cache.is_some(),
            "advisor ready"
        );

        Ok(Self {
            categories,
            catalog,
            city_index,
            places,
            geocoder,
            llm,
            llm_timeout,
            classifier,
            scrapers,
            cache,
            chain_detection: config.chain_detection,
            classify_concurrency: config.classify_concurrency,
            default_center,
        })
    }

    /// Replaces the brand classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn BrandClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Runs the full analysis for one free-text query.
    pub async fn run(&self, query: &str) -> AnalysisReport {
        let mut degraded = Vec::new();

        let intent = settle(
            &mut degraded,
            "intent",
            extract_intent(
                &self.llm,
                self.llm_timeout,
                &self.categories,
                &self.catalog,
                query,
            )
            .await,
        );
        let site = settle(&mut degraded, "location", self.locate(&intent).await);
        let amenities = settle(
            &mut degraded,
            "amenities",
            self.find_amenities(site.coordinates).await,
        );
        let competitors = settle(
            &mut degraded,
            "competitors",
            self.find_competitors(&intent.business_type, site.coordinates)
                .await,
        );
        let reviews = settle(
            &mut degraded,
            "reviews",
            self.fetch_reviews(&competitors.records).await,
        );
        let sentiment = analyze_market(&reviews.reviews);
        let chains = settle(
            &mut degraded,
            "chains",
            self.detect_chains(&competitors.records, &intent.business_type, site.area_name())
                .await,
        );
        let scraped = ScrapedData {
            records: self
                .scrapers
                .scrape(&intent.business_type, site.display_name())
                .await,
        };

        let market_overview = MarketOverview::from_market(&competitors.records, &sentiment);
        let top = top_competitors(
            site.coordinates,
            &competitors.records,
            &sentiment,
            &chains,
            TOP_COMPETITORS,
        );
        let brief = market_brief(
            &intent.business_type,
            &site,
            &market_overview,
            &top,
            &chains,
            &amenities,
            &scraped,
        );
        let recommendation = settle(
            &mut degraded,
            "recommendation",
            recommend(&self.llm, self.llm_timeout, &brief).await,
        );

        tracing::info!(
            business_type = %intent.business_type,
            area = %site.area_name(),
            competitors = competitors.records.len(),
            reviews = reviews.reviews.len(),
            degraded_steps = degraded.len(),
            "analysis complete"
        );

        AnalysisReport::build(
            ReportParts {
                intent,
                site,
                amenities,
                market_overview,
                top_competitors: top,
                chains,
                scraped,
                recommendation,
            },
            degraded,
        )
    }

    /// Resolves the site coordinates and names the surrounding area.
    ///
    /// Coordinates come from the property catalog, then forward geocoding,
    /// then the default centre. A catalogued site is named after its
    /// project; anything else is reverse geocoded.
    async fn locate(&self, intent: &Intent) -> Outcome<SiteLocation> {
        let mut problems = Vec::new();
        let name = intent.property_name.trim();
        let property_name = (!name.is_empty()).then(|| name.to_string());

        let (coordinates, coordinate_source) = if name.is_empty() {
            (self.default_center, CoordinateSource::Default)
        } else if let Some(property) = self
            .catalog
            .find_by_name(name)
            .or_else(|| self.catalog.find_in_query(name))
        {
            (property.coordinates, CoordinateSource::PropertyCatalog)
        } else {
            match self.geocoder.search(name).await {
                Ok(Some(found)) => (found, CoordinateSource::Geocoder),
                Ok(None) => {
                    problems.push(format!("no geocoding match for '{name}'"));
                    (self.default_center, CoordinateSource::Default)
                }
                Err(e) => {
                    problems.push(format!("geocoding '{name}' failed: {e}"));
                    (self.default_center, CoordinateSource::Default)
                }
            }
        };

        let area = match self.catalog.find_at(coordinates) {
            Some(property) => AreaInfo {
                area_name: property.project_name.clone(),
                ..AreaInfo::unknown()
            },
            None => self.geocoder.reverse(coordinates).await.unwrap_or_else(|e| {
                problems.push(format!("reverse geocoding failed: {e}"));
                AreaInfo::unknown()
            }),
        };

        tracing::info!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            area = %area.area_name,
            "site located"
        );

        let site = SiteLocation {
            coordinates,
            coordinate_source,
            property_name,
            area,
        };
        if problems.is_empty() {
            Outcome::Complete(site)
        } else {
            tracing::warn!(problems = %problems.join("; "), "site location fell back to defaults");
            Outcome::degraded(site, problems.join("; "))
        }
    }

    /// Searches each configured amenity type around the site, closest first.
    async fn find_amenities(&self, center: Coordinates) -> Outcome<Amenities> {
        let mut amenities = Amenities::default();
        let mut failures = Vec::new();

        for (kind, query) in &self.categories.amenity_queries {
            let places = match self
                .places
                .search_places(query, center, AMENITY_RADIUS_M)
                .await
            {
                Ok(raw) => {
                    let mut nearby: Vec<NearbyPlace> = raw
                        .into_iter()
                        .filter_map(|p| p.into_record(center))
                        .take(AMENITY_RESULTS_PER_TYPE)
                        .map(|record| NearbyPlace {
                            distance_km: center.distance_km(&record.coordinates),
                            record,
                        })
                        .collect();
                    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
                    nearby
                }
                Err(e) => {
                    tracing::warn!(amenity = %kind, error = %e, "amenity search failed");
                    failures.push(format!("{kind}: {e}"));
                    Vec::new()
                }
            };
            amenities.by_type.insert(kind.clone(), places);
        }

        tracing::info!(total = amenities.total(), "amenity search complete");
        if failures.is_empty() {
            Outcome::Complete(amenities)
        } else {
            Outcome::degraded(amenities, failures.join("; "))
        }
    }

    /// Searches competitors around the site, falling back to cached results.
    async fn find_competitors(
        &self,
        business_type: &str,
        center: Coordinates,
    ) -> Outcome<Competitors> {
        let query = self.categories.search_query(business_type);
        match self
            .places
            .search_places(&query, center, COMPETITOR_RADIUS_M)
            .await
        {
            Ok(raw) => {
                let records: Vec<BusinessRecord> =
                    raw.into_iter().filter_map(|p| p.into_record(center)).collect();
                tracing::info!(query = %query, count = records.len(), "competitor search complete");
                self.cache_places(business_type, &records).await;
                Outcome::Complete(Competitors {
                    records,
                    from_cache: false,
                })
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "competitor search failed; using cache");
                let records = self.cached_places(business_type, center).await;
                Outcome::degraded(
                    Competitors {
                        records,
                        from_cache: true,
                    },
                    format!("places search failed: {e}"),
                )
            }
        }
    }

    /// Fetches recent reviews for the first competitors that have an id.
    async fn fetch_reviews(&self, competitors: &[BusinessRecord]) -> Outcome<ReviewSet> {
        let mut set = ReviewSet::default();
        let mut failures = Vec::new();

        let targets = competitors
            .iter()
            .filter_map(|b| b.external_id.as_deref().map(|id| (b, id)))
            .take(REVIEWED_BUSINESSES);

        for (business, external_id) in targets {
            set.businesses_queried += 1;
            match self
                .places
                .get_place_reviews(external_id, REVIEWS_PER_BUSINESS)
                .await
            {
                Ok(raw) => {
                    let reviews: Vec<Review> = raw
                        .into_iter()
                        .filter_map(|r| r.into_review(&business.name, Some(external_id)))
                        .collect();
                    self.cache_reviews(&reviews).await;
                    set.reviews.extend(reviews);
                }
                Err(e) => {
                    tracing::warn!(business = %business.name, error = %e, "review fetch failed");
                    failures.push(format!("{}: {e}", business.name));
                    set.reviews.extend(self.cached_reviews(&business.name).await);
                }
            }
        }

        tracing::info!(
            businesses = set.businesses_queried,
            reviews = set.reviews.len(),
            "review collection complete"
        );
        if failures.is_empty() {
            Outcome::Complete(set)
        } else {
            Outcome::degraded(set, failures.join("; "))
        }
    }

    /// Combines the city index, result clustering, and model judgments.
    async fn detect_chains(
        &self,
        records: &[BusinessRecord],
        business_type: &str,
        area_hint: &str,
    ) -> Outcome<ChainReport> {
        let clusters = detect(records, &self.chain_detection);
        let classifications = classify_all(
            self.classifier.as_ref(),
            records,
            business_type,
            area_hint,
            self.classify_concurrency,
        )
        .await;
        let first_reason = classifications
            .iter()
            .find_map(Outcome::reason)
            .map(str::to_string);

        let businesses = enrich_all(records.to_vec(), &self.city_index, &clusters, classifications);
        let degraded = businesses
            .iter()
            .filter(|b| b.classification_degraded)
            .count();
        let report = ChainReport {
            businesses,
            clusters,
        };

        tracing::info!(
            chains = report.chain_names().len(),
            chain_businesses = report.chain_business_count(),
            degraded,
            "chain detection complete"
        );
        if degraded == 0 {
            Outcome::Complete(report)
        } else {
            let reason = format!(
                "{degraded} classifications used the fallback ({})",
                first_reason.unwrap_or_default()
            );
            Outcome::degraded(report, reason)
        }
    }

    async fn cache_places(&self, business_type: &str, records: &[BusinessRecord]) {
        let Some(pool) = &self.cache else { return };
        if let Err(e) = upsert_places(pool, business_type, records).await {
            tracing::warn!(error = %e, "failed to cache places");
        }
    }

    async fn cached_places(
        &self,
        business_type: &str,
        center: Coordinates,
    ) -> Vec<BusinessRecord> {
        let Some(pool) = &self.cache else {
            return Vec::new();
        };
        let bbox = BoundingBox::around(center, COMPETITOR_RADIUS_KM);
        match list_places_in_bbox(pool, business_type, &bbox).await {
            Ok(rows) => rows.into_iter().map(|row| row.into_record()).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached places");
                Vec::new()
            }
        }
    }

    async fn cache_reviews(&self, reviews: &[Review]) {
        let Some(pool) = &self.cache else { return };
        if let Err(e) = insert_reviews(pool, reviews).await {
            tracing::warn!(error = %e, "failed to cache reviews");
        }
    }

    async fn cached_reviews(&self, business_name: &str) -> Vec<Review> {
        let Some(pool) = &self.cache else {
            return Vec::new();
        };
        let limit = i64::try_from(REVIEWS_PER_BUSINESS).unwrap_or(i64::MAX);
        match list_reviews_for_business(pool, business_name, limit).await {
            Ok(rows) => rows.into_iter().map(|row| row.into_review()).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached reviews");
                Vec::new()
            }
        }
    }
}

/// Opens and migrates the cache; `None` (with a warning) on any failure.
async fn open_cache(url: &str) -> Option<SqlitePool> {
    let pool = match connect_pool(url, PoolConfig::default()).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "cache unavailable, continuing without it");
            return None;
        }
    };
    match run_migrations(&pool).await {
        Ok(applied) => {
            tracing::debug!(applied, "cache migrations applied");
            Some(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "cache migrations failed, continuing without it");
            None
        }
    }
}

/// Unwraps a step outcome, recording the step when it degraded.
fn settle<T>(degraded: &mut Vec<DegradedStep>, step: &str, outcome: Outcome<T>) -> T {
    if let Some(reason) = outcome.reason() {
        degraded.push(DegradedStep {
            step: step.to_string(),
            reason: reason.to_string(),
        });
    }
    outcome.into_value()
}
