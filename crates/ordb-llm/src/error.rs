use thiserror::Error;

/// Errors returned by the completion API client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the credential (HTTP 401/403).
    #[error("API key rejected: {0}")]
    ApiKey(String),

    /// The API rate-limited the request (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The API returned a server error (HTTP 5xx).
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Any other application-level API failure.
    #[error("API error: {0}")]
    Api(String),

    /// The completion came back with no choices or empty content.
    #[error("completion response missing choices or content")]
    EmptyCompletion,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
