//! Integration tests for `PlacesClient` and `Geocoder` using wiremock HTTP mocks.

use std::time::Duration;

use sitewise_core::Coordinates;
use sitewise_places::{Geocoder, PlacesClient, PlacesError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CENTER: Coordinates = Coordinates::new(30.68, 76.69);

fn places_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 30, Duration::ZERO, base_url, "sitewise-test")
        .expect("client construction should not fail")
}

fn geocoder(base_url: &str) -> Geocoder {
    Geocoder::with_base_url("sitewise-test", 30, base_url, Duration::ZERO)
        .expect("geocoder construction should not fail")
}

#[tokio::test]
async fn search_places_returns_local_results() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "search_metadata": { "status": "Success" },
        "local_results": [
            {
                "title": "CCD - Sector 17",
                "rating": 4.1,
                "reviews": 120,
                "type": "Cafe",
                "data_id": "0x1",
                "gps_coordinates": { "latitude": 30.74, "longitude": 76.78 }
            },
            "not an object",
            { "title": "Brew Bros", "rating": "n/a" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("engine", "google_maps"))
        .and(query_param("q", "cafe coffee shop"))
        .and(query_param("ll", "@30.68,76.69,3000m"))
        .and(query_param("type", "search"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = places_client(&server.uri());
    let places = client
        .search_places("cafe coffee shop", CENTER, 3000)
        .await
        .expect("search should succeed");

    assert_eq!(places.len(), 2);
    let records: Vec<_> = places
        .into_iter()
        .filter_map(|p| p.into_record(CENTER))
        .collect();
    assert_eq!(records[0].name, "CCD - Sector 17");
    assert_eq!(records[0].review_count, 120);
    assert_eq!(records[1].name, "Brew Bros");
    assert!(records[1].rating.is_none());
    assert_eq!(records[1].coordinates, CENTER);
}

#[tokio::test]
async fn search_with_no_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let places = places_client(&server.uri())
        .search_places("llama grooming", CENTER, 3000)
        .await
        .expect("no results is not an error");
    assert!(places.is_empty());
}

#[tokio::test]
async fn api_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let err = places_client(&server.uri())
        .search_places("cafe", CENTER, 3000)
        .await
        .expect_err("invalid key should fail");
    assert!(matches!(err, PlacesError::Api(ref m) if m == "Invalid API key."));
}

#[tokio::test]
async fn http_error_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = places_client(&server.uri())
        .search_places("cafe", CENTER, 3000)
        .await
        .expect_err("503 should fail");
    assert!(matches!(err, PlacesError::Http(_)));
}

#[tokio::test]
async fn reviews_are_limited_and_newest_first() {
    let server = MockServer::start().await;

    let reviews: Vec<serde_json::Value> = (0..25)
        .map(|i| {
            serde_json::json!({ "snippet": format!("review number {i} was fine"), "rating": 4 })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("engine", "google_maps_reviews"))
        .and(query_param("data_id", "0x1"))
        .and(query_param("sort_by", "newestFirst"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "reviews": reviews })),
        )
        .mount(&server)
        .await;

    let reviews = places_client(&server.uri())
        .get_place_reviews("0x1", 20)
        .await
        .expect("reviews should load");

    assert_eq!(reviews.len(), 20);
    assert_eq!(reviews[0].text(), Some("review number 0 was fine"));
}

#[tokio::test]
async fn reverse_geocode_extracts_area() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "jsonv2"))
        .and(query_param("lat", "30.68"))
        .and(query_param("lon", "76.69"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Sector 70, Mohali, Punjab, India",
            "address": { "suburb": "Sector 70", "city": "Mohali", "country": "India" }
        })))
        .mount(&server)
        .await;

    let area = geocoder(&server.uri())
        .reverse(CENTER)
        .await
        .expect("reverse should succeed");
    assert_eq!(area.area_name, "Sector 70");
    assert_eq!(area.city.as_deref(), Some("Mohali"));
    assert_eq!(area.full_address.as_deref(), Some("Sector 70, Mohali, Punjab, India"));
}

#[tokio::test]
async fn reverse_geocode_unresolvable_point_is_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .mount(&server)
        .await;

    let area = geocoder(&server.uri())
        .reverse(Coordinates::new(0.0, 0.0))
        .await
        .expect("unresolvable point is not an error");
    assert_eq!(area.area_name, "Unknown");
}

#[tokio::test]
async fn forward_search_parses_string_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Sector 17, Chandigarh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "30.7410", "lon": "76.7821", "display_name": "Sector 17" }
        ])))
        .mount(&server)
        .await;

    let point = geocoder(&server.uri())
        .search("Sector 17, Chandigarh")
        .await
        .expect("search should succeed")
        .expect("one hit");
    assert!((point.latitude - 30.741).abs() < 1e-9);
    assert!((point.longitude - 76.7821).abs() < 1e-9);
}

#[tokio::test]
async fn forward_search_without_hits_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let point = geocoder(&server.uri())
        .search("nowhere at all")
        .await
        .expect("search should succeed");
    assert!(point.is_none());
}

#[tokio::test]
async fn search_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "sitewise-ops/2.0 (ops@example.com)"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "local_results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url(
        "test-key",
        30,
        Duration::ZERO,
        &server.uri(),
        "sitewise-ops/2.0 (ops@example.com)",
    )
    .expect("client construction should not fail");
    let places = client
        .search_places("cafe", CENTER, 3_000)
        .await
        .expect("search should succeed with the configured agent");
    assert!(places.is_empty());
}
