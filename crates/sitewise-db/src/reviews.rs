//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use sitewise_core::Review;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub business_name: String,
    pub external_id: Option<String>,
    pub review_text: String,
    pub rating: Option<f64>,
    pub review_date: Option<String>,
    pub author: Option<String>,
    pub cached_at: DateTime<Utc>,
}

impl ReviewRow {
    #[must_use]
    pub fn into_review(self) -> Review {
        Review {
            business_name: self.business_name,
            external_id: self.external_id,
            text: self.review_text,
            rating: self.rating,
            date: self.review_date,
            author: self.author,
        }
    }
}

/// Insert reviews, ignoring any already cached for the same business and text.
///
/// Returns the number of new rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the batch is rolled back.
pub async fn insert_reviews(pool: &SqlitePool, reviews: &[Review]) -> Result<u64, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut inserted = 0_u64;

    for review in reviews {
        let result = sqlx::query(
            "INSERT INTO reviews \
                 (business_name, external_id, review_text, rating, review_date, author, cached_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (business_name, review_text) DO NOTHING",
        )
        .bind(&review.business_name)
        .bind(&review.external_id)
        .bind(&review.text)
        .bind(review.rating)
        .bind(&review.date)
        .bind(&review.author)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(inserted, "reviews cached");
    Ok(inserted)
}

/// List cached reviews for one business, oldest insert first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews_for_business(
    pool: &SqlitePool,
    business_name: &str,
    limit: i64,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, business_name, external_id, review_text, rating, review_date, author, \
                cached_at \
         FROM reviews \
         WHERE business_name = ? \
         ORDER BY id ASC \
         LIMIT ?",
    )
    .bind(business_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
