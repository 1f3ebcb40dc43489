//! Natural-language command dispatcher for the outreach database.
//!
//! A command flows through four stages: credential guard, connectivity
//! probe, intent resolution (LLM with retry, or heuristic fallback when the
//! API is unreachable), and action routing. Every outcome, whether success,
//! degraded fallback, or failure, is a JSON payload; errors never escape
//! as panics or unstructured strings.

use serde_json::Value;
use sqlx::PgPool;

pub mod credentials;
mod error;
pub mod export;
pub mod fallback;
mod intent;
pub mod response;
mod router;

pub use error::AssistantError;
pub use intent::{Action, Intent, IntentSource};

use ordb_core::AppConfig;
use ordb_llm::{CompletionClient, LlmError};
use ordb_mailer::{EmailSender, MailTransport, SmtpMailer};

/// The intent dispatcher.
///
/// Holds the database pool, the completion client, and the mail sender; all
/// configuration is injected at construction, never read from the process
/// environment inside command handling.
pub struct Assistant<T: MailTransport> {
    pool: PgPool,
    client: CompletionClient,
    sender: EmailSender<T>,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl Assistant<SmtpMailer> {
    /// Production assistant wired from application config.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if the SMTP sender cannot be
    /// constructed, or [`AssistantError::Unexpected`] if the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<Self, AssistantError> {
        let client = CompletionClient::with_base_url(
            config.openai_api_key.as_deref().unwrap_or_default(),
            &config.openai_model,
            config.llm_request_timeout_secs,
            &config.openai_base_url,
        )
        .map_err(|e| AssistantError::Unexpected(e.to_string()))?;
        let sender = EmailSender::from_config(config)?;
        Ok(Self::new(
            pool,
            client,
            sender,
            config.openai_api_key.clone(),
            config.llm_max_retries,
            config.llm_backoff_base_ms,
        ))
    }
}

impl<T: MailTransport> Assistant<T> {
    /// Assembles an assistant from explicit collaborators (used by tests).
    #[must_use]
    pub fn new(
        pool: PgPool,
        client: CompletionClient,
        sender: EmailSender<T>,
        api_key: Option<String>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            pool,
            client,
            sender,
            api_key,
            max_retries,
            backoff_base_ms,
        }
    }

    /// Processes one free-text command to completion.
    ///
    /// Always returns a JSON payload: the action result on success
    /// (tagged `using_fallback` when the heuristic path produced the
    /// intent), or `{error, suggestion, status}` on failure. All failures
    /// are logged with their kind before conversion.
    pub async fn process_command(&self, command: &str) -> Value {
        match self.process_inner(command).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(status = e.status(), error = %e, command, "command failed");
                response::failure(&e)
            }
        }
    }

    async fn process_inner(&self, command: &str) -> Result<Value, AssistantError> {
        let intent = self.resolve_intent(command).await?;
        let used_fallback = intent.source == IntentSource::Fallback;
        let payload = router::route(&self.pool, &self.sender, &intent, command).await?;
        if used_fallback {
            Ok(response::mark_fallback(payload))
        } else {
            Ok(payload)
        }
    }

    /// Resolves a command into a routable intent.
    ///
    /// Credential shape problems short-circuit before any network I/O.
    /// When the connectivity probe fails the heuristic fallback is tried;
    /// a matching rule yields a degraded intent, otherwise the connection
    /// failure is surfaced with remediation text. A probe that fails with
    /// an auth rejection surfaces as `api_key_error` directly: the
    /// network is fine in that case and degraded results would mask a
    /// configuration problem.
    ///
    /// # Errors
    ///
    /// Any [`AssistantError`] kind except `UnsupportedAction`, which is
    /// produced during validation of the model's response and so can also
    /// appear here.
    pub async fn resolve_intent(&self, command: &str) -> Result<Intent, AssistantError> {
        credentials::validate_api_key(self.api_key.as_deref())?;

        if let Err(probe_err) = self.client.list_models().await {
            if let LlmError::ApiKey(msg) = probe_err {
                return Err(AssistantError::ApiKey(msg));
            }
            tracing::warn!(error = %probe_err, "connectivity probe failed, trying fallback");
            return match fallback::resolve(command) {
                Some(intent) => Ok(intent),
                None => Err(AssistantError::Connection(format!(
                    "completion API unreachable and no fallback pattern matched: {probe_err}"
                ))),
            };
        }

        let raw = self
            .client
            .extract_intent_with_retry(command, self.max_retries, self.backoff_base_ms)
            .await?;
        tracing::debug!(action = %raw.action, "intent extracted");
        Intent::from_raw(raw)
    }
}
