//! Integration tests for `LlmBrandClassifier` against a mocked model endpoint.

use std::time::Duration;

use sitewise_chains::{BrandClassifier, LlmBrandClassifier};
use sitewise_core::{ClassificationSource, FALLBACK_CLASSIFICATION_REASONING};
use sitewise_llm::LlmClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier(base_url: &str, call_timeout: Duration) -> LlmBrandClassifier {
    let client = LlmClient::with_base_url("test-key", "test-model", 30, base_url, "sitewise-test")
        .expect("client construction should not fail");
    LlmBrandClassifier::new(client, call_timeout)
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn branded_answer_is_complete() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"is_branded\": true, \"brand_name\": \"Cafe Coffee Day\", \
             \"confidence\": 0.95, \"reasoning\": \"national chain\", \
             \"classification_type\": \"branded\"}\n```",
        )),
    )
    .await;

    let outcome = classifier(&server.uri(), Duration::from_secs(5))
        .classify("CCD - Sector 17", "cafe", "Sector 17")
        .await;

    assert!(!outcome.is_degraded());
    let c = outcome.value();
    assert!(c.is_branded);
    assert_eq!(c.brand_name, "Cafe Coffee Day");
    assert_eq!(c.source, ClassificationSource::LlmJudgment);
}

#[tokio::test]
async fn simulated_timeout_falls_back() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(completion(
                "{\"is_branded\": true, \"brand_name\": \"X\", \"confidence\": 0.9}",
            ))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let outcome = classifier(&server.uri(), Duration::from_millis(200))
        .classify("Joe's Diner", "restaurant", "Phase 7")
        .await;

    assert!(outcome.is_degraded());
    assert!(outcome.reason().is_some_and(|r| r.contains("timed out")));
    let c = outcome.value();
    assert!(!c.is_branded);
    assert!((c.confidence - 0.5).abs() < f64::EPSILON);
    assert_eq!(c.reasoning, FALLBACK_CLASSIFICATION_REASONING);
    assert_eq!(c.brand_name, "Joe's Diner");
}

#[tokio::test]
async fn non_json_answer_falls_back() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion("I think it is local.")),
    )
    .await;

    let outcome = classifier(&server.uri(), Duration::from_secs(5))
        .classify("Lone Bakery", "bakery", "")
        .await;

    assert!(outcome.is_degraded());
    assert_eq!(outcome.value().reasoning, FALLBACK_CLASSIFICATION_REASONING);
}

#[tokio::test]
async fn answer_missing_fields_falls_back() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion("{\"is_branded\": true}")),
    )
    .await;

    let outcome = classifier(&server.uri(), Duration::from_secs(5))
        .classify("Brew Bros", "cafe", "")
        .await;

    assert!(outcome.is_degraded());
    assert!(!outcome.value().is_branded);
}

#[tokio::test]
async fn server_error_falls_back() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500)).await;

    let outcome = classifier(&server.uri(), Duration::from_secs(5))
        .classify("Brew Bros", "cafe", "")
        .await;

    assert!(outcome.is_degraded());
    assert!(outcome.reason().is_some_and(|r| r.contains("500")));
}
