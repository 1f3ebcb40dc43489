//! Completion-API client for natural-language intent extraction.

mod client;
mod error;
mod retry;
mod types;

pub use client::CompletionClient;
pub use error::LlmError;
pub use types::RawIntent;
