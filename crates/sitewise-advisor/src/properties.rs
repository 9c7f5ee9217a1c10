//! Catalog of known commercial properties with fixed coordinates.
//!
//! A query naming a catalogued project or developer brand resolves to that
//! property's coordinates without geocoding.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sitewise_core::Coordinates;

use crate::error::AdvisorError;

/// Two coordinates closer than this (in degrees) are the same property.
const COORDINATE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub project_name: String,
    pub brand_name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
struct PropertyRow {
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    brand_name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl PropertyRow {
    fn into_property(self) -> Option<Property> {
        let project_name = self.project_name.trim().to_string();
        if project_name.is_empty() {
            return None;
        }
        Some(Property {
            project_name,
            brand_name: self.brand_name.trim().to_string(),
            coordinates: Coordinates::new(self.latitude?, self.longitude?),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
}

impl PropertyCatalog {
    #[must_use]
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    /// Reads a CSV with `project_name`, `brand_name`, `latitude` and
    /// `longitude` columns. Rows without a project name or coordinates are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::Properties`] if the file cannot be opened or
    /// its header read.
    pub fn load(path: &Path) -> Result<Self, AdvisorError> {
        let path_display = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AdvisorError::Properties {
                path: path_display.clone(),
                source: e,
            })?;

        let mut properties = Vec::new();
        let mut skipped = 0_usize;
        for row in reader.deserialize::<PropertyRow>() {
            match row.ok().and_then(PropertyRow::into_property) {
                Some(property) => properties.push(property),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(path = %path_display, skipped, "skipped malformed property rows");
        }

        Ok(Self { properties })
    }

    /// Like [`PropertyCatalog::load`], but a missing or unreadable file
    /// yields an empty catalog with a warning.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "property catalog unavailable, continuing without it");
            Self::default()
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Property> {
        self.properties.first()
    }

    /// Finds the property a free-text query mentions.
    ///
    /// Project names are checked before developer brand names, both as
    /// case-insensitive substrings of the query.
    #[must_use]
    pub fn find_in_query(&self, query: &str) -> Option<&Property> {
        let lowered = query.to_lowercase();
        self.properties
            .iter()
            .find(|p| lowered.contains(&p.project_name.to_lowercase()))
            .or_else(|| {
                self.properties.iter().find(|p| {
                    !p.brand_name.is_empty() && lowered.contains(&p.brand_name.to_lowercase())
                })
            })
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Property> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.properties.iter().find(|p| {
            p.project_name.to_lowercase() == wanted || p.brand_name.to_lowercase() == wanted
        })
    }

    /// The property sitting exactly at `point`, if any.
    #[must_use]
    pub fn find_at(&self, point: Coordinates) -> Option<&Property> {
        self.properties.iter().find(|p| {
            (p.coordinates.latitude - point.latitude).abs() < COORDINATE_TOLERANCE
                && (p.coordinates.longitude - point.longitude).abs() < COORDINATE_TOLERANCE
        })
    }
}
