//! Database operations for the `places` table.

use chrono::{DateTime, Utc};
use sitewise_core::{BoundingBox, BusinessRecord, Coordinates};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `places` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    pub id: i64,
    pub business_type: String,
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub category: String,
    pub external_id: Option<String>,
    pub price: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub cached_at: DateTime<Utc>,
}

impl PlaceRow {
    #[must_use]
    pub fn into_record(self) -> BusinessRecord {
        BusinessRecord {
            name: self.name,
            address: self.address,
            rating: self.rating,
            review_count: u32::try_from(self.review_count).unwrap_or(0),
            category: self.category,
            external_id: self.external_id,
            price: self.price,
            coordinates: Coordinates::new(self.latitude, self.longitude),
        }
    }
}

/// Insert or refresh places found by a search for `business_type`, keyed
/// on `(business_type, name, latitude, longitude)`.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the batch is rolled back.
pub async fn upsert_places(
    pool: &SqlitePool,
    business_type: &str,
    records: &[BusinessRecord],
) -> Result<u64, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut written = 0_u64;

    for record in records {
        let result = sqlx::query(
            "INSERT INTO places \
                 (business_type, name, address, rating, review_count, category, external_id, \
                  price, latitude, longitude, cached_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (business_type, name, latitude, longitude) DO UPDATE SET \
                 address      = excluded.address, \
                 rating       = excluded.rating, \
                 review_count = excluded.review_count, \
                 category     = excluded.category, \
                 external_id  = excluded.external_id, \
                 price        = excluded.price, \
                 cached_at    = excluded.cached_at",
        )
        .bind(business_type)
        .bind(&record.name)
        .bind(&record.address)
        .bind(record.rating)
        .bind(i64::from(record.review_count))
        .bind(&record.category)
        .bind(&record.external_id)
        .bind(&record.price)
        .bind(record.coordinates.latitude)
        .bind(record.coordinates.longitude)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(business_type, written, "places cached");
    Ok(written)
}

/// List places cached for `business_type` inside `bbox`.
///
/// Results are ordered by rating (unrated last), then name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_places_in_bbox(
    pool: &SqlitePool,
    business_type: &str,
    bbox: &BoundingBox,
) -> Result<Vec<PlaceRow>, DbError> {
    let rows = sqlx::query_as::<_, PlaceRow>(
        "SELECT id, business_type, name, address, rating, review_count, category, \
                external_id, price, latitude, longitude, cached_at \
         FROM places \
         WHERE business_type = ? \
           AND latitude BETWEEN ? AND ? \
           AND longitude BETWEEN ? AND ? \
         ORDER BY rating IS NULL, rating DESC, name ASC",
    )
    .bind(business_type)
    .bind(bbox.min_latitude)
    .bind(bbox.max_latitude)
    .bind(bbox.min_longitude)
    .bind(bbox.max_longitude)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
