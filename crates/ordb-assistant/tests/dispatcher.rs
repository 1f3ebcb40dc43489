//! End-to-end dispatcher tests using wiremock for the completion API.
//!
//! The database pool is constructed with `connect_lazy`, which never opens a
//! connection; every path exercised here is expected to resolve before any
//! query runs, so no Postgres instance is needed.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ordb_assistant::{Action, Assistant, IntentSource};
use ordb_llm::CompletionClient;
use ordb_mailer::{EmailSender, MailTransport, MailerError};

struct OkTransport;

#[async_trait]
impl MailTransport for OkTransport {
    async fn send_html(
        &self,
        _from: &lettre::message::Mailbox,
        _to: &str,
        _subject: &str,
        _html_body: &str,
    ) -> Result<(), MailerError> {
        Ok(())
    }
}

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool construction should not fail")
}

fn plausible_key() -> String {
    format!("sk-{}", "a".repeat(48))
}

fn assistant(base_url: &str, api_key: Option<String>) -> Assistant<OkTransport> {
    let client = CompletionClient::with_base_url(
        api_key.as_deref().unwrap_or_default(),
        "gpt-3.5-turbo",
        5,
        base_url,
    )
    .expect("client construction should not fail");
    let sender = EmailSender::with_transport(OkTransport, "outreach@example.com", "AI Outreach");
    Assistant::new(lazy_pool(), client, sender, api_key, 2, 0)
}

async fn mount_models_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{ "id": "gpt-3.5-turbo", "object": "model" }]
        })))
        .mount(server)
        .await;
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

// Nothing listens on port 1, so every request fails at connect time.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn short_key_is_a_configuration_error_with_no_network_call() {
    // A dead endpoint would produce connection_error if any request were
    // attempted; configuration_error proves the guard short-circuited first.
    let assistant = assistant(DEAD_ENDPOINT, Some("sk-tooshort".to_string()));
    let result = assistant.process_command("Find daycares in Boston").await;
    assert_eq!(result["status"], "configuration_error");
    assert!(!result["suggestion"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_key_is_a_configuration_error() {
    let assistant = assistant(DEAD_ENDPOINT, None);
    let result = assistant.process_command("Find daycares in Boston").await;
    assert_eq!(result["status"], "configuration_error");
}

#[tokio::test]
async fn probe_failure_routes_matching_commands_to_fallback() {
    let assistant = assistant(DEAD_ENDPOINT, Some(plausible_key()));
    let intent = assistant
        .resolve_intent("Find all influencers in France with 10k+ followers")
        .await
        .expect("fallback should produce an intent");
    assert_eq!(intent.source, IntentSource::Fallback);
    assert_eq!(intent.action, Action::SearchInfluencers);
    assert_eq!(
        intent.params.get("country").and_then(|v| v.as_str()),
        Some("France")
    );
}

#[tokio::test]
async fn probe_failure_without_fallback_surfaces_connection_error() {
    let assistant = assistant(DEAD_ENDPOINT, Some(plausible_key()));
    let result = assistant.process_command("What's the weather today?").await;
    assert_eq!(result["status"], "connection_error");
    assert!(result["suggestion"]
        .as_str()
        .unwrap()
        .contains("connectivity"));
}

#[tokio::test]
async fn probe_auth_rejection_is_an_api_key_error_not_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": {"message": "bad key"}})),
        )
        .mount(&server)
        .await;

    let assistant = assistant(&server.uri(), Some(plausible_key()));
    // This command matches a fallback rule, but a rejected key must not be
    // masked by degraded results.
    let result = assistant
        .process_command("Find all influencers in France")
        .await;
    assert_eq!(result["status"], "api_key_error");
}

#[tokio::test]
async fn llm_path_resolves_a_typed_intent() {
    let server = MockServer::start().await;
    mount_models_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"action": "search_daycares", "params": {"city": "New York", "limit": 10}}"#,
        )))
        .mount(&server)
        .await;

    let assistant = assistant(&server.uri(), Some(plausible_key()));
    let intent = assistant
        .resolve_intent("List top 10 daycares in New York")
        .await
        .expect("LLM path should resolve");
    assert_eq!(intent.source, IntentSource::Llm);
    assert_eq!(intent.action, Action::SearchDaycares);
}

#[tokio::test]
async fn malformed_intent_json_fails_immediately_with_json_error() {
    let server = MockServer::start().await;
    mount_models_ok(&server).await;
    // expect(1): malformed content is permanent, never retried.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("not json at all")))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = assistant(&server.uri(), Some(plausible_key()));
    let result = assistant.process_command("Find daycares").await;
    assert_eq!(result["status"], "json_error");
}

#[tokio::test]
async fn unknown_action_tags_are_rejected() {
    let server = MockServer::start().await;
    mount_models_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"action": "delete_all_contacts", "params": {}}"#,
        )))
        .mount(&server)
        .await;

    let assistant = assistant(&server.uri(), Some(plausible_key()));
    let result = assistant.process_command("Delete all contacts").await;
    assert_eq!(result["status"], "unsupported_action");
    assert!(result["error"]
        .as_str()
        .unwrap()
        .contains("delete_all_contacts"));
}

#[tokio::test]
async fn unsupported_export_format_is_rejected_before_any_query() {
    let server = MockServer::start().await;
    mount_models_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"action": "export_contacts", "params": {"target_type": "daycare", "format": "pdf"}}"#,
        )))
        .mount(&server)
        .await;

    // The lazy pool has no live connection; reaching the database would fail
    // with unexpected_error, so value_error proves the format check ran first.
    let assistant = assistant(&server.uri(), Some(plausible_key()));
    let result = assistant
        .process_command("Export all daycares as a PDF")
        .await;
    assert_eq!(result["status"], "value_error");
    assert!(result["error"].as_str().unwrap().contains("pdf"));
}

#[tokio::test]
async fn transient_failures_exhaust_retries_then_surface_connection_error() {
    let server = MockServer::start().await;
    mount_models_ok(&server).await;
    // 1 initial attempt + 2 retries (assistant is built with max_retries=2).
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({"error": {"message": "overloaded"}})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let assistant = assistant(&server.uri(), Some(plausible_key()));
    let result = assistant.process_command("Find daycares").await;
    assert_eq!(result["status"], "connection_error");
}
