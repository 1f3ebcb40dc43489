//! Heuristic intent extraction for when the completion API is unreachable.
//!
//! An ordered list of (matcher, extractor) rules evaluated in sequence; the
//! first matching rule produces the intent. This is deliberate keyword
//! matching over a small phrase set, not general language understanding;
//! good enough to keep the four core actions usable offline.

use regex::Regex;
use serde_json::{Map, Value};

use ordb_core::{Region, TargetType};

use crate::intent::{Action, Intent, IntentSource};

/// Default batch size when an outreach command names no count.
const DEFAULT_OUTREACH_COUNT: i64 = 10;

struct FallbackRule {
    action: Action,
    matches: fn(&str) -> bool,
    extract: fn(&str) -> Map<String, Value>,
}

/// Rules are evaluated top to bottom; order matters. Export and outreach
/// come before the searches because their phrasings often also contain
/// search verbs ("export the list of daycares").
fn rules() -> [FallbackRule; 4] {
    [
        FallbackRule {
            action: Action::ExportContacts,
            matches: |cmd| {
                cmd.contains("export") && (names_target_type(cmd) || cmd.contains("contact"))
            },
            extract: extract_export_params,
        },
        FallbackRule {
            action: Action::SendOutreach,
            matches: |cmd| {
                (cmd.contains("send") || cmd.contains("outreach") || cmd.contains("email"))
                    && names_target_type(cmd)
            },
            extract: extract_outreach_params,
        },
        FallbackRule {
            action: Action::SearchInfluencers,
            matches: |cmd| has_search_verb(cmd) && cmd.contains("influencer"),
            extract: extract_influencer_params,
        },
        FallbackRule {
            action: Action::SearchDaycares,
            matches: |cmd| has_search_verb(cmd) && cmd.contains("daycare"),
            extract: extract_daycare_params,
        },
    ]
}

/// Attempts to derive an intent from the command using the fallback rules.
///
/// Returns `None` when no rule matches, meaning "no fallback available",
/// not an error; the caller reports the original connection failure then.
#[must_use]
pub fn resolve(command: &str) -> Option<Intent> {
    let lower = command.to_lowercase();
    for rule in rules() {
        if (rule.matches)(&lower) {
            tracing::info!(action = rule.action.as_str(), "fallback rule matched");
            return Some(Intent {
                action: rule.action,
                params: (rule.extract)(&lower),
                source: IntentSource::Fallback,
            });
        }
    }
    None
}

fn has_search_verb(cmd: &str) -> bool {
    ["find", "search", "list", "show"]
        .iter()
        .any(|v| cmd.contains(v))
}

fn names_target_type(cmd: &str) -> bool {
    cmd.contains("daycare") || cmd.contains("influencer")
}

/// Fixed country lexicon. Each entry is (needle in the lowercased command,
/// canonical country name, canonical region tag).
const COUNTRY_LEXICON: &[(&str, &str, Region)] = &[
    ("france", "France", Region::France),
    ("french", "France", Region::France),
    ("usa", "USA", Region::Usa),
    ("united states", "USA", Region::Usa),
    ("america", "USA", Region::Usa),
];

fn find_country(cmd: &str) -> Option<(&'static str, Region)> {
    COUNTRY_LEXICON
        .iter()
        .find(|(needle, _, _)| cmd.contains(needle))
        .map(|(_, country, region)| (*country, *region))
}

/// Parses an approximate follower threshold: "10k followers", "10k+
/// followers", "5000 followers".
fn find_min_followers(cmd: &str) -> Option<i64> {
    let re = Regex::new(r"(\d+)\s*(k)?\s*\+?\s*followers?").expect("valid followers regex");
    let caps = re.captures(cmd)?;
    let base: i64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = if caps.get(2).is_some() { 1_000 } else { 1 };
    Some(base.saturating_mul(multiplier))
}

/// First standalone integer in the command, for counts and limits.
fn find_count(cmd: &str) -> Option<i64> {
    let re = Regex::new(r"\b(\d+)\b").expect("valid count regex");
    re.captures(cmd)?.get(1)?.as_str().parse().ok()
}

fn extract_influencer_params(cmd: &str) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some((country, _)) = find_country(cmd) {
        params.insert("country".to_string(), Value::from(country));
    }
    if let Some(min) = find_min_followers(cmd) {
        params.insert("min_followers".to_string(), Value::from(min));
    }
    params
}

fn extract_daycare_params(cmd: &str) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some((_, region)) = find_country(cmd) {
        params.insert("region".to_string(), Value::from(region.as_str()));
    }
    let re = Regex::new(r"top\s+(\d+)").expect("valid top-n regex");
    if let Some(limit) = re
        .captures(cmd)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        params.insert("limit".to_string(), Value::from(limit));
    }
    params
}

fn extract_outreach_params(cmd: &str) -> Map<String, Value> {
    let mut params = Map::new();
    let target_type = if cmd.contains("daycare") {
        "daycare"
    } else {
        "influencer"
    };
    params.insert("target_type".to_string(), Value::from(target_type));
    params.insert(
        "count".to_string(),
        Value::from(find_count(cmd).unwrap_or(DEFAULT_OUTREACH_COUNT)),
    );
    if let Some((_, region)) = find_country(cmd) {
        params.insert("region".to_string(), Value::from(region.as_str()));
    }
    params
}

fn extract_export_params(cmd: &str) -> Map<String, Value> {
    let mut params = Map::new();
    // "export contacts" without a type is left for the router to resolve
    // (and reject with a value_error naming the expected types).
    if let Some(target_type) = TargetType::from_loose(cmd) {
        params.insert("target_type".to_string(), Value::from(target_type.as_str()));
    }
    params.insert("format".to_string(), Value::from("csv"));
    if let Some((_, region)) = find_country(cmd) {
        params.insert("region".to_string(), Value::from(region.as_str()));
    }
    params
}
