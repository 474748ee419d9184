//! The normalized emergency instruction produced by the response normalizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity tier. Ordered `Low < Moderate < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DangerLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl DangerLevel {
    pub const ALL: [DangerLevel; 4] = [
        DangerLevel::Critical,
        DangerLevel::High,
        DangerLevel::Moderate,
        DangerLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive match against the four canonical tokens, anything else
    /// collapses to `Moderate`.
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Moderate)
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DangerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MODERATE" => Ok(Self::Moderate),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!("Unknown danger level: {}", s)),
        }
    }
}

/// Validated, policy-enforced guidance for one analyzed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyInstruction {
    /// Situation category in the canonical (untranslated) vocabulary.
    #[serde(rename = "type")]
    pub emergency_type: String,
    pub danger_level: DangerLevel,
    /// Up to three short imperative steps, localized.
    pub actions: Vec<String>,
    pub warning: String,
    pub reasoning: String,
}

impl EmergencyInstruction {
    /// Text handed to speech synthesis: type, danger level, actions, warning
    /// and reasoning joined by `". "`, empty items skipped.
    pub fn narration(&self) -> String {
        let level = format!("Danger level: {}", self.danger_level);
        std::iter::once(self.emergency_type.as_str())
            .chain(std::iter::once(level.as_str()))
            .chain(self.actions.iter().map(String::as_str))
            .chain([self.warning.as_str(), self.reasoning.as_str()])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(". ")
    }
}
