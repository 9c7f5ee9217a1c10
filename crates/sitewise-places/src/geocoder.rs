//! Nominatim forward and reverse geocoding.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use sitewise_core::Coordinates;

use crate::error::PlacesError;
use crate::pacing::RequestPacer;
use crate::types::AreaInfo;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Nominatim's usage policy allows one request per second.
const DEFAULT_MIN_GAP: Duration = Duration::from_secs(1);

/// Address components, most specific first, that can name an area.
const AREA_COMPONENTS: [&str; 9] = [
    "neighbourhood",
    "suburb",
    "quarter",
    "residential",
    "city_district",
    "borough",
    "municipality",
    "town",
    "village",
];

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    client: Client,
    base_url: Url,
    pacer: RequestPacer,
}

impl Geocoder {
    /// Creates a geocoder pointed at the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(user_agent, timeout_secs, DEFAULT_BASE_URL, DEFAULT_MIN_GAP)
    }

    /// Creates a geocoder with a custom base URL and request gap.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
        min_gap: Duration,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            pacer: RequestPacer::new(min_gap),
        })
    }

    /// Names the area around `point`.
    ///
    /// A point Nominatim cannot resolve yields [`AreaInfo::unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] on network failure or non-2xx status,
    /// or [`PlacesError::Deserialize`] if the body does not parse.
    pub async fn reverse(&self, point: Coordinates) -> Result<AreaInfo, PlacesError> {
        let url = self.build_url(
            "reverse",
            &[
                ("lat", &point.latitude.to_string()),
                ("lon", &point.longitude.to_string()),
                ("zoom", "16"),
                ("addressdetails", "1"),
            ],
        )?;

        let body = self.request_json(&url).await?;
        if body.get("error").is_some() {
            return Ok(AreaInfo::unknown());
        }

        let parsed: ReverseResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: "nominatim reverse".to_string(),
                source: e,
            })?;

        Ok(area_from_address(&parsed.address, parsed.display_name))
    }

    /// Forward-geocodes free text; `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Same as [`Geocoder::reverse`].
    pub async fn search(&self, text: &str) -> Result<Option<Coordinates>, PlacesError> {
        let url = self.build_url("search", &[("q", text), ("limit", "1")])?;
        let body = self.request_json(&url).await?;

        let hits: Vec<SearchHit> =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("nominatim search(q={text})"),
                source: e,
            })?;

        Ok(hits.into_iter().next().and_then(|hit| {
            let latitude = hit.lat.parse::<f64>().ok()?;
            let longitude = hit.lon.parse::<f64>().ok()?;
            Some(Coordinates::new(latitude, longitude))
        }))
    }

    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "jsonv2");
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        self.pacer.wait_for_slot().await;

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

fn component(address: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    address
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn area_from_address(
    address: &serde_json::Map<String, serde_json::Value>,
    display_name: Option<String>,
) -> AreaInfo {
    let area_name = AREA_COMPONENTS
        .iter()
        .find_map(|key| component(address, key))
        .unwrap_or_else(|| AreaInfo::UNKNOWN_AREA.to_string());

    AreaInfo {
        area_name,
        city: component(address, "city")
            .or_else(|| component(address, "town"))
            .or_else(|| component(address, "village")),
        state: component(address, "state"),
        country: component(address, "country"),
        full_address: display_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn area_prefers_most_specific_component() {
        let info = area_from_address(
            &address(serde_json::json!({
                "suburb": "Sector 70",
                "city_district": "Mohali",
                "city": "Sahibzada Ajit Singh Nagar",
                "state": "Punjab",
                "country": "India"
            })),
            Some("Sector 70, Mohali, Punjab, India".to_string()),
        );
        assert_eq!(info.area_name, "Sector 70");
        assert_eq!(info.city.as_deref(), Some("Sahibzada Ajit Singh Nagar"));
        assert_eq!(info.state.as_deref(), Some("Punjab"));
    }

    #[test]
    fn neighbourhood_beats_suburb() {
        let info = area_from_address(
            &address(serde_json::json!({ "neighbourhood": "Phase 3B2", "suburb": "Mohali" })),
            None,
        );
        assert_eq!(info.area_name, "Phase 3B2");
    }

    #[test]
    fn village_is_last_resort_and_city_falls_back_to_town() {
        let info = area_from_address(
            &address(serde_json::json!({ "village": "Landran", "town": "Kharar" })),
            None,
        );
        assert_eq!(info.area_name, "Kharar");
        assert_eq!(info.city.as_deref(), Some("Kharar"));
    }

    #[test]
    fn empty_address_is_unknown() {
        let info = area_from_address(&serde_json::Map::new(), None);
        assert_eq!(info.area_name, "Unknown");
        assert!(info.city.is_none());
    }
}
