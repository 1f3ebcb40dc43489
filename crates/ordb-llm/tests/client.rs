//! Integration tests for `CompletionClient` using wiremock HTTP mocks.

use ordb_llm::{CompletionClient, LlmError};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CompletionClient {
    CompletionClient::with_base_url("sk-test", "gpt-3.5-turbo", 30, base_url)
        .expect("client construction should not fail")
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn extract_intent_parses_action_and_params() {
    let server = MockServer::start().await;

    let content =
        r#"{"action": "search_influencers", "params": {"country": "France", "min_followers": 10000}}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let intent = client
        .extract_intent("Find all influencers in France with 10k+ followers")
        .await
        .expect("should parse intent");

    assert_eq!(intent.action, "search_influencers");
    assert_eq!(
        intent.params.get("country").and_then(|v| v.as_str()),
        Some("France")
    );
    assert_eq!(
        intent.params.get("min_followers").and_then(serde_json::Value::as_i64),
        Some(10_000)
    );
}

#[tokio::test]
async fn extract_intent_maps_401_to_api_key_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .extract_intent("Find daycares")
        .await
        .expect_err("401 must fail");

    assert!(
        matches!(err, LlmError::ApiKey(ref msg) if msg.contains("Incorrect API key")),
        "expected ApiKey, got: {err:?}"
    );
}

#[tokio::test]
async fn extract_intent_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"error": {"message": "Rate limit reached"}})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .extract_intent("Find daycares")
        .await
        .expect_err("429 must fail");
    assert!(matches!(err, LlmError::RateLimited(_)), "got: {err:?}");
}

#[tokio::test]
async fn malformed_intent_json_fails_without_retry() {
    let server = MockServer::start().await;

    // `expect(1)` asserts exactly one request reaches the server: malformed
    // content is a permanent failure, never retried.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("this is not json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .extract_intent_with_retry("Find daycares", 3, 0)
        .await
        .expect_err("malformed content must fail");
    assert!(matches!(err, LlmError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn empty_choices_fail_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .extract_intent_with_retry("Find daycares", 3, 0)
        .await
        .expect_err("empty choices must fail");
    assert!(matches!(err, LlmError::EmptyCompletion), "got: {err:?}");
}

#[tokio::test]
async fn transient_5xx_is_retried_exactly_max_retries_times() {
    let server = MockServer::start().await;

    // 1 initial attempt + 2 retries, all failing with 503.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({"error": {"message": "overloaded"}})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .extract_intent_with_retry("Find daycares", 2, 0)
        .await
        .expect_err("exhausted retries must fail");
    assert!(
        matches!(err, LlmError::Server { status: 503, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn list_models_returns_ids() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "object": "list",
        "data": [
            { "id": "gpt-3.5-turbo", "object": "model" },
            { "id": "gpt-4o-mini", "object": "model" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let models = client.list_models().await.expect("should list models");
    assert_eq!(models, vec!["gpt-3.5-turbo", "gpt-4o-mini"]);
}

#[tokio::test]
async fn list_models_surfaces_auth_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": {"message": "bad key"}})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_models().await.expect_err("401 must fail");
    assert!(matches!(err, LlmError::ApiKey(_)), "got: {err:?}");
}
