//! Raw response shapes from the maps search and geocoding APIs.
//!
//! Every field is optional and wrong-typed values are read as absent; the
//! conversion into [`BusinessRecord`] / [`Review`] is the single place where
//! defaults are applied.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use sitewise_core::{BusinessRecord, Coordinates, Review};

/// Deserializes `T`, mapping a value of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of `local_results` from a `google_maps` search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    /// Review count.
    #[serde(default, deserialize_with = "lenient")]
    pub reviews: Option<u32>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub place_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub gps_coordinates: Option<GpsCoordinates>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<String>,
}

impl RawPlace {
    /// Converts into a [`BusinessRecord`]; places without a title are dropped.
    ///
    /// Missing coordinates default to `center`, missing review counts to 0,
    /// and ratings outside `0.0..=5.0` are discarded.
    #[must_use]
    pub fn into_record(self, center: Coordinates) -> Option<BusinessRecord> {
        let name = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let coordinates = self
            .gps_coordinates
            .map_or(center, |g| Coordinates::new(g.latitude, g.longitude));

        Some(BusinessRecord {
            name,
            address: non_blank(self.address),
            rating: self.rating.filter(|r| (0.0..=5.0).contains(r)),
            review_count: self.reviews.unwrap_or(0),
            category: self.place_type.unwrap_or_default(),
            external_id: non_blank(self.data_id),
            price: non_blank(self.price),
            coordinates,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUser {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedSnippet {
    #[serde(default, deserialize_with = "lenient")]
    pub original: Option<String>,
}

/// One entry of `reviews` from a `google_maps_reviews` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    #[serde(default, deserialize_with = "lenient")]
    pub snippet: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub extracted_snippet: Option<ExtractedSnippet>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub iso_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<ReviewUser>,
}

impl RawReview {
    /// Review text: the snippet, or the untranslated original when the
    /// snippet is missing.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.snippet
            .as_deref()
            .or_else(|| {
                self.extracted_snippet
                    .as_ref()
                    .and_then(|s| s.original.as_deref())
            })
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Converts into a [`Review`]; reviews without text are dropped.
    #[must_use]
    pub fn into_review(self, business_name: &str, external_id: Option<&str>) -> Option<Review> {
        let text = self.text()?.to_string();
        Some(Review {
            business_name: business_name.to_string(),
            external_id: external_id.map(str::to_string),
            text,
            rating: self.rating,
            date: self.iso_date.or(self.date),
            author: self.user.and_then(|u| u.name),
        })
    }
}

/// Area details from reverse geocoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaInfo {
    pub area_name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub full_address: Option<String>,
}

impl AreaInfo {
    pub const UNKNOWN_AREA: &'static str = "Unknown";

    #[must_use]
    pub fn unknown() -> Self {
        Self {
            area_name: Self::UNKNOWN_AREA.to_string(),
            city: None,
            state: None,
            country: None,
            full_address: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
