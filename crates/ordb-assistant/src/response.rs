//! Caller-facing result payloads.
//!
//! Every command resolves to a JSON object: an action-specific payload on
//! success, or `{error, suggestion, status}` on failure. Fallback-derived
//! successes are tagged so callers can show a degraded-mode notice.

use serde_json::{json, Value};

use crate::error::AssistantError;

/// Converts an error into the uniform failure payload.
#[must_use]
pub fn failure(err: &AssistantError) -> Value {
    json!({
        "error": err.to_string(),
        "suggestion": err.suggestion(),
        "status": err.status(),
    })
}

/// Tags a success payload as produced by the heuristic fallback path.
#[must_use]
pub fn mark_fallback(payload: Value) -> Value {
    let mut payload = payload;
    if let Value::Object(map) = &mut payload {
        map.insert("status".to_string(), Value::from("using_fallback"));
        map.insert(
            "note".to_string(),
            Value::from(
                "The completion API was unreachable; this result came from keyword matching \
                 and may be less precise.",
            ),
        );
    }
    payload
}
