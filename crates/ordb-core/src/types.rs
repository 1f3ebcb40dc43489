//! Shared domain enums for contact records.
//!
//! Regions and platforms are stored as uppercase text in Postgres; these
//! enums own the parsing and canonical string forms so the DB layer and
//! the assistant agree on spellings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Market region a daycare belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Usa,
    France,
}

impl Region {
    /// Canonical uppercase form as stored in the `region` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Usa => "USA",
            Region::France => "FRANCE",
        }
    }

    /// Parses a region from loose user input (`"usa"`, `"United States"`,
    /// `"france"`), returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "usa" | "us" | "united states" | "america" | "american" => Some(Region::Usa),
            "france" | "fr" | "french" => Some(Region::France),
            _ => None,
        }
    }

    /// Email template language for this region.
    #[must_use]
    pub fn language(self) -> &'static str {
        match self {
            Region::Usa => "en",
            Region::France => "fr",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::parse_loose(s).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "region".to_string(),
            reason: format!("unknown region '{s}'"),
        })
    }
}

/// Social platform an influencer publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Youtube,
    Instagram,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "YOUTUBE",
            Platform::Instagram => "INSTAGRAM",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which contact collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Daycare,
    Influencer,
}

impl TargetType {
    /// Lowercase tag as stored in `outreach_history.target_type`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Daycare => "daycare",
            TargetType::Influencer => "influencer",
        }
    }

    /// Matches a free-text type description by keyword containment, so
    /// `"random daycares"` and `"USA daycare"` both resolve to `Daycare`.
    #[must_use]
    pub fn from_loose(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("daycare") {
            Some(TargetType::Daycare)
        } else if lower.contains("influencer") {
            Some(TargetType::Influencer)
        } else {
            None
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
