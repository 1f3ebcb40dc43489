//! Resolved command intents.

use serde_json::{Map, Value};

use ordb_core::TargetType;
use ordb_llm::RawIntent;

use crate::error::AssistantError;

/// The closed set of actions the dispatcher can execute. Anything else is
/// rejected as `unsupported_action`, never silently executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SearchInfluencers,
    SearchDaycares,
    SendOutreach,
    ExportContacts,
}

impl Action {
    /// Parses an action tag as emitted by the model or the fallback rules.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::UnsupportedAction`] for unknown tags.
    pub fn parse(tag: &str) -> Result<Self, AssistantError> {
        match tag.trim() {
            "search_influencers" => Ok(Action::SearchInfluencers),
            "search_daycares" => Ok(Action::SearchDaycares),
            "send_outreach" => Ok(Action::SendOutreach),
            "export_contacts" => Ok(Action::ExportContacts),
            other => Err(AssistantError::UnsupportedAction(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::SearchInfluencers => "search_influencers",
            Action::SearchDaycares => "search_daycares",
            Action::SendOutreach => "send_outreach",
            Action::ExportContacts => "export_contacts",
        }
    }
}

/// Where an intent came from: the model, or the degraded heuristic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    Llm,
    Fallback,
}

/// A validated, routable interpretation of one command.
#[derive(Debug, Clone)]
pub struct Intent {
    pub action: Action,
    pub params: Map<String, Value>,
    pub source: IntentSource,
}

impl Intent {
    /// Validates a raw model response into a routable intent.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::UnsupportedAction`] if the action tag is
    /// outside the supported set.
    pub fn from_raw(raw: RawIntent) -> Result<Self, AssistantError> {
        Ok(Self {
            action: Action::parse(&raw.action)?,
            params: raw.params,
            source: IntentSource::Llm,
        })
    }

    /// String parameter, trimmed; `None` when absent or not a string.
    #[must_use]
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str).map(str::trim)
    }

    /// Integer parameter; accepts both JSON numbers and numeric strings,
    /// since models are inconsistent about which they emit.
    #[must_use]
    pub fn int_param(&self, key: &str) -> Option<i64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Resolves the target type: first from the `target_type` param (keyword
    /// containment), then by scanning the raw command text. Models sometimes
    /// return an empty `target_type` even when the command names one.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Value`] if neither source names a supported
    /// target type.
    pub fn resolve_target_type(&self, command: &str) -> Result<TargetType, AssistantError> {
        let from_param = self.str_param("target_type").and_then(TargetType::from_loose);
        if let Some(t) = from_param {
            return Ok(t);
        }
        TargetType::from_loose(command).ok_or_else(|| {
            AssistantError::Value(format!(
                "unsupported target_type: '{}' (expected daycare or influencer)",
                self.str_param("target_type").unwrap_or_default()
            ))
        })
    }
}
