//! Closed error taxonomy for the intent dispatcher.
//!
//! Every failure the dispatcher can produce maps onto exactly one
//! caller-facing status string, by error kind rather than by inspecting error
//! message text.

use thiserror::Error;

use ordb_llm::LlmError;

/// Errors produced while processing an assistant command.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Missing or malformed credential/configuration; fatal, no retry.
    #[error("configuration error: {0}")]
    Config(String),

    /// The completion API was unreachable after retries were exhausted.
    #[error("connection error: {0}")]
    Connection(String),

    /// The completion API rejected the credential.
    #[error("API key error: {0}")]
    ApiKey(String),

    /// Bad parameter values: unsupported target type, export format, counts.
    #[error("{0}")]
    Value(String),

    /// The model's response was not the expected intent JSON.
    #[error("malformed intent JSON: {0}")]
    Json(String),

    /// The resolved action tag is outside the supported set.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// Anything else, surfaced with a generic suggestion.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AssistantError {
    /// Caller-facing status tag for this error kind.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            AssistantError::Config(_) => "configuration_error",
            AssistantError::Connection(_) => "connection_error",
            AssistantError::ApiKey(_) => "api_key_error",
            AssistantError::Value(_) => "value_error",
            AssistantError::Json(_) => "json_error",
            AssistantError::UnsupportedAction(_) => "unsupported_action",
            AssistantError::Unexpected(_) => "unexpected_error",
        }
    }

    /// Actionable remediation text shown alongside the error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            AssistantError::Config(_) => {
                "Set a valid OPENAI_API_KEY in the environment (or .env file) and restart."
            }
            AssistantError::Connection(_) => {
                "Check network connectivity and the completion API base URL, then retry."
            }
            AssistantError::ApiKey(_) => {
                "Verify the OPENAI_API_KEY value is current and has access to the configured model."
            }
            AssistantError::Value(_) => "Adjust the command parameters and try again.",
            AssistantError::Json(_) => {
                "Retry the command; if the problem persists, try rephrasing it."
            }
            AssistantError::UnsupportedAction(_) => {
                "Supported commands: search daycares, search influencers, send outreach, export contacts."
            }
            AssistantError::Unexpected(_) => "Check the logs for details and try again.",
        }
    }
}

impl From<LlmError> for AssistantError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ApiKey(msg) => AssistantError::ApiKey(msg),
            LlmError::Http(e) => AssistantError::Connection(e.to_string()),
            LlmError::Server { status, message } => {
                AssistantError::Connection(format!("HTTP {status}: {message}"))
            }
            LlmError::RateLimited(msg) => {
                AssistantError::Connection(format!("rate limited: {msg}"))
            }
            LlmError::EmptyCompletion => {
                AssistantError::Json("completion had no choices or content".to_string())
            }
            LlmError::Deserialize { context, source } => {
                AssistantError::Json(format!("{context}: {source}"))
            }
            LlmError::Api(msg) => AssistantError::Unexpected(msg),
        }
    }
}

impl From<ordb_db::DbError> for AssistantError {
    fn from(err: ordb_db::DbError) -> Self {
        AssistantError::Unexpected(format!("database error: {err}"))
    }
}

impl From<ordb_mailer::MailerError> for AssistantError {
    fn from(err: ordb_mailer::MailerError) -> Self {
        match err {
            ordb_mailer::MailerError::Config(msg) => AssistantError::Config(msg),
            other => AssistantError::Unexpected(other.to_string()),
        }
    }
}
