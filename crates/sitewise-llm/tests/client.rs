//! Integration tests for `LlmClient` using wiremock HTTP mocks.

use std::time::Duration;

use sitewise_llm::{LlmClient, LlmError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, timeout_secs: u64) -> LlmClient {
    LlmClient::with_base_url(
        "test-key",
        "test-model",
        timeout_secs,
        &format!("{base_url}/v1"),
        "sitewise-test",
    )
        .expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn complete_text_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("user-agent", "sitewise-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  hello  ")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 5);
    let text = client
        .complete_text("system", "say hello", 0.0)
        .await
        .expect("should return content");
    assert_eq!(text, "hello");
}

#[tokio::test]
async fn complete_json_strips_fences() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"business_type\": \"cafe\", \"property_name\": \"Plot 7\"}\n```",
        )))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 5);
    let value = client
        .complete_json("system", "extract", 0.1)
        .await
        .expect("should parse fenced JSON");
    assert_eq!(value["business_type"], "cafe");
    assert_eq!(value["property_name"], "Plot 7");
}

#[tokio::test]
async fn non_success_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 5);
    let err = client
        .complete_text("system", "prompt", 0.0)
        .await
        .expect_err("429 should fail");
    assert!(
        matches!(err, LlmError::UnexpectedStatus { status: 429, ref body } if body == "rate limited"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn empty_choices_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 5);
    let err = client
        .complete_text("system", "prompt", 0.0)
        .await
        .expect_err("no choices should fail");
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client
        .complete_text("system", "prompt", 0.0)
        .await
        .expect_err("should time out");
    assert!(matches!(err, LlmError::Timeout), "unexpected error: {err:?}");
}
