//! Supported output languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Natural language the guidance is localized into.
///
/// JSON keys, `type` and `dangerLevel` stay in the canonical English vocabulary
/// whatever the target language; only free-text values are translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Arabic,
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Arabic, Language::French];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "Arabic",
            Self::French => "French",
        }
    }

    /// Name used inside the prompt, with the endonym for non-English targets.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "Arabic (العربية)",
            Self::French => "French (Français)",
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Arabic => "ar",
            Self::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "arabic" | "ar" | "العربية" => Ok(Self::Arabic),
            "french" | "fr" | "français" | "francais" => Ok(Self::French),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}
