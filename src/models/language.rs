//! Supported site languages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A language the site publishes content in.
///
/// English is the canonical language: every localized lookup falls back to it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Zh,
    Ja,
    Ko,
}

impl Language {
    /// All supported languages, canonical language first.
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::De,
        Language::Zh,
        Language::Ja,
        Language::Ko,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Zh => "zh",
            Self::Ja => "ja",
            Self::Ko => "ko",
        }
    }

    /// Parse a language code. Region suffixes (`de-DE`, `zh_CN`) are ignored.
    pub fn from_str(s: &str) -> Option<Self> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            "zh" => Some(Self::Zh),
            "ja" => Some(Self::Ja),
            "ko" => Some(Self::Ko),
            _ => None,
        }
    }

    /// Human-readable language name, used in translation prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::De => "German",
            Self::Zh => "Simplified Chinese",
            Self::Ja => "Japanese",
            Self::Ko => "Korean",
        }
    }

    /// Whether this is the canonical language.
    pub fn is_canonical(&self) -> bool {
        *self == Self::En
    }

    /// Lookup order for localized values: the language itself, then English.
    pub fn fallback_chain(&self) -> Vec<Language> {
        if self.is_canonical() {
            vec![Self::En]
        } else {
            vec![*self, Self::En]
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
