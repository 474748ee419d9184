//! Normalization policy: category vocabulary and the safety overrides applied to model output.

use serde::{Deserialize, Serialize};

pub const DEFAULT_REASONING_PLACEHOLDER: &str = "No specific reasoning provided.";
pub const DEFAULT_MAX_ACTIONS: usize = 3;

/// Configurable policy for the response normalizer.
///
/// The category list varies between deployments, so it lives here instead of
/// in a hard-coded enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationPolicy {
    /// Canonical situation categories, in the endpoint's vocabulary.
    pub categories: Vec<String>,
    /// Case-insensitive substrings of `type` that mean "no emergency"; these force `LOW`.
    pub no_emergency_markers: Vec<String>,
    /// Substitute for a missing `reasoning`.
    pub reasoning_placeholder: String,
    /// Actions beyond this count are dropped.
    pub max_actions: usize,
    /// Reject a `type` outside `categories` instead of passing it through.
    pub strict_categories: bool,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            categories: vec![
                "Severe Bleeding".to_string(),
                "Fire or Smoke".to_string(),
                "Not an Emergency".to_string(),
            ],
            no_emergency_markers: vec![
                "not an emergency".to_string(),
                "not_an_emergency".to_string(),
            ],
            reasoning_placeholder: DEFAULT_REASONING_PLACEHOLDER.to_string(),
            max_actions: DEFAULT_MAX_ACTIONS,
            strict_categories: false,
        }
    }
}

impl NormalizationPolicy {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strict_categories(mut self, strict: bool) -> Self {
        self.strict_categories = strict;
        self
    }

    pub fn is_no_emergency(&self, emergency_type: &str) -> bool {
        let t = emergency_type.to_lowercase();
        self.no_emergency_markers
            .iter()
            .any(|m| !m.is_empty() && t.contains(&m.to_lowercase()))
    }

    pub fn is_known_category(&self, emergency_type: &str) -> bool {
        let t = emergency_type.trim();
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(t))
    }
}
