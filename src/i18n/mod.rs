//! Compile-time UI strings.
//!
//! Lookups fall back per key to English, and unknown keys return the key.

mod tables;

use crate::models::Language;

fn table(language: Language) -> Option<&'static [(&'static str, &'static str)]> {
    match language {
        Language::En => Some(tables::EN),
        Language::Zh => Some(tables::ZH),
        Language::Ja => Some(tables::JA),
        Language::Ko => Some(tables::KO),
        Language::De => None,
    }
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    table(language)?
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Translate a dotted key.
pub fn t(language: Language, key: &str) -> String {
    language
        .fallback_chain()
        .into_iter()
        .find_map(|lang| lookup(lang, key))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Whether a language ships its own table.
pub fn has_table(language: Language) -> bool {
    table(language).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_lookup() {
        assert_eq!(t(Language::Zh, "nav.contact"), "联系我们");
        assert_eq!(t(Language::En, "nav.contact"), "Contact");
    }

    #[test]
    fn test_language_without_table_uses_english() {
        assert!(!has_table(Language::De));
        assert_eq!(t(Language::De, "nav.contact"), "Contact");
    }

    #[test]
    fn test_missing_key_falls_back_per_key() {
        assert_eq!(t(Language::Ja, "page.not_found"), "This page has no content yet.");
        assert_eq!(t(Language::Ja, "nav.news"), "ニュース");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(t(Language::Ko, "nope.missing"), "nope.missing");
    }

    #[test]
    fn test_english_table_has_no_duplicates() {
        let mut keys: Vec<_> = tables::EN.iter().map(|(k, _)| *k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), tables::EN.len());
    }
}
