//! Cache round trips against an in-memory SQLite database.

use sitewise_core::{BoundingBox, BusinessRecord, Coordinates, Review};
use sitewise_db::{
    connect_pool, insert_reviews, list_places_in_bbox, list_reviews_for_business, run_migrations,
    upsert_places, PoolConfig,
};
use sqlx::SqlitePool;

const CENTER: Coordinates = Coordinates::new(30.68, 76.69);

async fn memory_pool() -> SqlitePool {
    let pool = connect_pool("sqlite::memory:", PoolConfig::single())
        .await
        .expect("in-memory pool");
    let applied = run_migrations(&pool).await.expect("migrations");
    assert_eq!(applied, 2);
    pool
}

fn place(name: &str, lat: f64, lon: f64, rating: Option<f64>, category: &str) -> BusinessRecord {
    BusinessRecord {
        rating,
        category: category.to_string(),
        review_count: 10,
        ..BusinessRecord::new(name, Coordinates::new(lat, lon))
    }
}

fn review(business: &str, text: &str) -> Review {
    Review {
        business_name: business.to_string(),
        external_id: Some("0x1".to_string()),
        text: text.to_string(),
        rating: Some(4.0),
        date: Some("2026-10-01".to_string()),
        author: Some("Asha".to_string()),
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let pool = memory_pool().await;
    assert_eq!(run_migrations(&pool).await.expect("rerun"), 0);
}

#[tokio::test]
async fn places_upsert_and_bbox_query() {
    let pool = memory_pool().await;

    let written = upsert_places(
        &pool,
        "cafe",
        &[
            place("Brew Bros", 30.681, 76.691, Some(4.4), "Coffee shop"),
            place("Chai Point", 30.690, 76.700, None, "Cafe"),
            place("Far Away Cafe", 31.500, 77.500, Some(4.9), "Cafe"),
            place("Sharma Dhaba", 30.685, 76.695, Some(4.1), "Restaurant"),
        ],
    )
    .await
    .expect("upsert");
    assert_eq!(written, 4);
    upsert_places(
        &pool,
        "pharmacy",
        &[place("Apollo Pharmacy", 30.682, 76.692, Some(4.8), "Pharmacy")],
    )
    .await
    .expect("upsert pharmacy");

    let bbox = BoundingBox::around(CENTER, 3.0);
    let rows = list_places_in_bbox(&pool, "cafe", &bbox).await.expect("query");
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    // Rated first by rating, unrated last; the distant cafe is outside the
    // box and the pharmacy belongs to another search.
    assert_eq!(names, vec!["Brew Bros", "Sharma Dhaba", "Chai Point"]);
    assert!(rows.iter().all(|r| r.business_type == "cafe"));
}

#[tokio::test]
async fn upsert_refreshes_existing_place() {
    let pool = memory_pool().await;

    upsert_places(&pool, "cafe", &[place("Brew Bros", 30.681, 76.691, Some(4.0), "Cafe")])
        .await
        .expect("first upsert");
    upsert_places(&pool, "cafe", &[place("Brew Bros", 30.681, 76.691, Some(4.6), "Cafe")])
        .await
        .expect("second upsert");

    let rows = list_places_in_bbox(&pool, "cafe", &BoundingBox::around(CENTER, 3.0))
        .await
        .expect("query");
    assert_eq!(rows.len(), 1);
    let record = rows.into_iter().next().expect("row").into_record();
    assert_eq!(record.rating, Some(4.6));
    assert_eq!(record.review_count, 10);
}

#[tokio::test]
async fn reviews_deduplicate_on_business_and_text() {
    let pool = memory_pool().await;

    let first = insert_reviews(
        &pool,
        &[
            review("Brew Bros", "Great coffee and friendly staff"),
            review("Brew Bros", "Slow service at lunch"),
            review("Chai Point", "Great coffee and friendly staff"),
        ],
    )
    .await
    .expect("insert");
    assert_eq!(first, 3);

    let again = insert_reviews(&pool, &[review("Brew Bros", "Slow service at lunch")])
        .await
        .expect("insert again");
    assert_eq!(again, 0);

    let rows = list_reviews_for_business(&pool, "Brew Bros", 20)
        .await
        .expect("query");
    assert_eq!(rows.len(), 2);
    let first_review = rows.into_iter().next().expect("row").into_review();
    assert_eq!(first_review.text, "Great coffee and friendly staff");
    assert_eq!(first_review.author.as_deref(), Some("Asha"));

    let limited = list_reviews_for_business(&pool, "Brew Bros", 1)
        .await
        .expect("query");
    assert_eq!(limited.len(), 1);
}
