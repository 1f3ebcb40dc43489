//! Credential guard: validated before any network I/O.

use crate::error::AssistantError;

/// Minimum plausible length for a completion API key. Real keys are longer;
/// anything shorter is a copy/paste accident or a placeholder.
const MIN_API_KEY_LEN: usize = 40;

const KEY_PREFIX: &str = "sk-";

/// Checks that an API key is present and has a plausible shape.
///
/// This is a pure shape check: no network call is made, so a malformed key
/// short-circuits to `configuration_error` without any I/O.
///
/// # Errors
///
/// Returns [`AssistantError::Config`] when the key is missing, empty, has
/// the wrong prefix, or is too short.
pub fn validate_api_key(key: Option<&str>) -> Result<(), AssistantError> {
    let key = key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AssistantError::Config("OPENAI_API_KEY is not set".to_string()))?;

    if !key.starts_with(KEY_PREFIX) {
        return Err(AssistantError::Config(format!(
            "OPENAI_API_KEY does not start with '{KEY_PREFIX}'"
        )));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err(AssistantError::Config(format!(
            "OPENAI_API_KEY is too short ({} chars, expected at least {MIN_API_KEY_LEN})",
            key.len()
        )));
    }
    Ok(())
}
