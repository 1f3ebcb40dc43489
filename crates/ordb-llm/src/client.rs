//! HTTP client for an OpenAI-style completion API.
//!
//! Wraps `reqwest` with typed request/response handling, credential
//! management, and an HTTP-status-to-error-kind mapping so callers can
//! classify failures without inspecting error text. Exposes a cheap
//! `list_models` call used as a connectivity probe before intent analysis.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ModelsResponse, RawIntent, ResponseFormat,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Fixed instruction describing the exact JSON shape the model must return.
const INTENT_SYSTEM_PROMPT: &str = "Analyze this marketing command and return JSON with:\n\
     - \"action\": \"search_influencers\", \"search_daycares\", \"send_outreach\", or \"export_contacts\"\n\
     - \"params\": {relevant parameters including \"target_type\" for outreach and export commands}";

/// Client for an OpenAI-style completion API.
///
/// Manages the HTTP client, API key, model id, and base URL. Use
/// [`CompletionClient::new`] for production or
/// [`CompletionClient::with_base_url`] to point at a mock server in tests.
pub struct CompletionClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl CompletionClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LlmError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ordb/0.1 (outreach-assistant)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends path segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| LlmError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Lists the model ids visible to this credential.
    ///
    /// Used as a lightweight connectivity probe: a successful call means the
    /// API is reachable and the key is at least syntactically accepted.
    ///
    /// # Errors
    ///
    /// - [`LlmError::ApiKey`] if the API rejects the credential.
    /// - [`LlmError::Http`] / [`LlmError::Server`] on network or 5xx failures.
    /// - [`LlmError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = self.endpoint("models")?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let body = Self::check_status(response).await?;

        let parsed: ModelsResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: "listModels".to_owned(),
                source: e,
            })?;
        Ok(parsed.data.into_iter().map(|m| m.id).collect())
    }

    /// Sends a command to the model and parses the returned intent JSON.
    ///
    /// The request pins temperature to 0.1 and JSON-object response mode, so
    /// the model's message content is expected to be a single JSON object
    /// with `action` and `params` keys.
    ///
    /// # Errors
    ///
    /// - [`LlmError::ApiKey`] / [`LlmError::RateLimited`] on 401/403/429.
    /// - [`LlmError::Http`] / [`LlmError::Server`] on network or 5xx failures.
    /// - [`LlmError::EmptyCompletion`] if no choices or content came back.
    /// - [`LlmError::Deserialize`] if the content is not valid intent JSON.
    pub async fn extract_intent(&self, command: &str) -> Result<RawIntent, LlmError> {
        let url = self.endpoint("chat/completions")?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: INTENT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: command,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: 0.1,
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = Self::check_status(response).await?;

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: "chatCompletions envelope".to_owned(),
                source: e,
            })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyCompletion)?;

        serde_json::from_str(&content).map_err(|e| LlmError::Deserialize {
            context: "intent JSON in completion content".to_owned(),
            source: e,
        })
    }

    /// [`extract_intent`](Self::extract_intent) wrapped in
    /// exponential-back-off retry.
    ///
    /// Only transient failures (connection errors, timeouts, 5xx) are
    /// retried, up to `max_retries` additional attempts with the delay
    /// doubling from `backoff_base_ms`. Credential, rate-limit, and
    /// malformed-response errors fail on the first attempt.
    ///
    /// # Errors
    ///
    /// Same as [`extract_intent`](Self::extract_intent), after retries are
    /// exhausted for transient kinds.
    pub async fn extract_intent_with_retry(
        &self,
        command: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<RawIntent, LlmError> {
        retry_with_backoff(max_retries, backoff_base_ms, || {
            self.extract_intent(command)
        })
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, LlmError> {
        self.base_url
            .join(path)
            .map_err(|e| LlmError::Api(format!("invalid endpoint path '{path}': {e}")))
    }

    /// Maps HTTP status codes onto error kinds and returns the body on 2xx.
    ///
    /// 401/403 become [`LlmError::ApiKey`], 429 becomes
    /// [`LlmError::RateLimited`], 5xx becomes [`LlmError::Server`], and any
    /// other non-success status becomes [`LlmError::Api`].
    async fn check_status(response: reqwest::Response) -> Result<String, LlmError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = api_error_message(&body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LlmError::ApiKey(message)),
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited(message)),
            s if s.is_server_error() => Err(LlmError::Server {
                status: s.as_u16(),
                message,
            }),
            s => Err(LlmError::Api(format!("HTTP {s}: {message}"))),
        }
    }
}

/// Pulls the `error.message` field out of an API error body, falling back to
/// the raw body (truncated) when the shape is unexpected.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
