//! HTTP client for the `SerpApi` Google Maps engines.
//!
//! Two engines are used: `google_maps` for nearby search and
//! `google_maps_reviews` for a place's reviews. Requests from one client are
//! spaced by a configurable delay.

use std::time::Duration;

use reqwest::{Client, Url};
use sitewise_core::Coordinates;

use crate::error::PlacesError;
use crate::pacing::RequestPacer;
use crate::types::{RawPlace, RawReview};

const DEFAULT_BASE_URL: &str = "https://serpapi.com/";
const DEFAULT_USER_AGENT: &str = "sitewise/0.1 (site-feasibility)";

/// Error text `SerpApi` returns for a search with zero hits.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    pacer: RequestPacer,
}

impl PlacesClient {
    /// Creates a client pointed at the production `SerpApi` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        request_delay: Duration,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            request_delay,
            DEFAULT_BASE_URL,
            DEFAULT_USER_AGENT,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock)
    /// and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        request_delay: Duration,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .and_then(|u| u.join("search"))
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            pacer: RequestPacer::new(request_delay),
        })
    }

    /// Searches for places matching `query` around `center`.
    ///
    /// Entries of `local_results` that are not JSON objects are skipped. A
    /// search with zero hits returns an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the API reports an error in the body.
    /// - [`PlacesError::Http`] on network failure or non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body is not JSON.
    pub async fn search_places(
        &self,
        query: &str,
        center: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<RawPlace>, PlacesError> {
        let ll = format!("@{},{},{radius_m}m", center.latitude, center.longitude);
        let url = self.build_url(
            "google_maps",
            &[("q", query), ("ll", &ll), ("type", "search")],
        );

        let Some(body) = self.request_json(&url).await? else {
            return Ok(Vec::new());
        };

        let places: Vec<RawPlace> = body
            .get("local_results")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.is_object())
                    .filter_map(|e| serde_json::from_value(e.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(query, radius_m, results = places.len(), "places search complete");
        Ok(places)
    }

    /// Fetches up to `limit` of the newest reviews for a place.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::search_places`].
    pub async fn get_place_reviews(
        &self,
        data_id: &str,
        limit: usize,
    ) -> Result<Vec<RawReview>, PlacesError> {
        let url = self.build_url(
            "google_maps_reviews",
            &[("data_id", data_id), ("sort_by", "newestFirst")],
        );

        let Some(body) = self.request_json(&url).await? else {
            return Ok(Vec::new());
        };

        let reviews = body
            .get("reviews")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.is_object())
                    .filter_map(|e| serde_json::from_value(e.clone()).ok())
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default();

        Ok(reviews)
    }

    /// Builds the request URL with `engine`, the API key, and `extra` params.
    fn build_url(&self, engine: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("engine", engine);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("api_key", &self.api_key);
        }
        url
    }

    /// Sends a paced GET and parses the body as JSON.
    ///
    /// Returns `Ok(None)` when the API reports that the search had no results.
    async fn request_json(&self, url: &Url) -> Result<Option<serde_json::Value>, PlacesError> {
        self.pacer.wait_for_slot().await;

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: redact_key(url),
                source: e,
            })?;

        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            if message.contains(NO_RESULTS_MARKER) {
                return Ok(None);
            }
            return Err(PlacesError::Api(message.to_string()));
        }

        Ok(Some(value))
    }
}

/// URL for error context, without the API key.
fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "api_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
