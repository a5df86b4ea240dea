//! Glossary protection for machine translation.
//!
//! Terms are swapped for placeholder tokens before text is sent out and
//! restored afterwards with the target-language term, or the original text
//! when the glossary has no translation for that language.

use std::collections::BTreeMap;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Language;

/// A term with fixed translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    /// Language code to translated term. Missing languages keep the term.
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

/// A replaced occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub token: String,
    /// Text as it appeared in the source.
    pub original: String,
    /// Index into the glossary.
    pub entry: usize,
}

fn token(n: usize) -> String {
    format!("[[T{n}]]")
}

/// Replace glossary terms in `text` with placeholder tokens.
///
/// Matching is case-insensitive and longer terms win over shorter ones.
pub fn protect(text: &str, glossary: &[GlossaryEntry]) -> (String, Vec<Placeholder>) {
    let mut order: Vec<usize> = (0..glossary.len())
        .filter(|&i| !glossary[i].term.trim().is_empty())
        .collect();
    order.sort_by_key(|&i| std::cmp::Reverse(glossary[i].term.chars().count()));

    let mut out = text.to_string();
    let mut placeholders = Vec::new();
    for i in order {
        let pattern = format!("(?i){}", regex::escape(glossary[i].term.trim()));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping glossary term '{}': {}", glossary[i].term, e);
                continue;
            }
        };

        let mut replaced = String::with_capacity(out.len());
        let mut last = 0;
        for m in re.find_iter(&out) {
            let t = token(placeholders.len());
            replaced.push_str(&out[last..m.start()]);
            replaced.push_str(&t);
            placeholders.push(Placeholder {
                token: t,
                original: m.as_str().to_string(),
                entry: i,
            });
            last = m.end();
        }
        replaced.push_str(&out[last..]);
        out = replaced;
    }

    (out, placeholders)
}

/// Put glossary terms back in place of their tokens.
pub fn restore(
    text: &str,
    placeholders: &[Placeholder],
    glossary: &[GlossaryEntry],
    target: Language,
) -> String {
    let mut out = text.to_string();
    for p in placeholders {
        let replacement = glossary
            .get(p.entry)
            .and_then(|e| e.translations.get(target.as_str()))
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| p.original.clone());

        if out.contains(&p.token) {
            out = out.replace(&p.token, &replacement);
        } else {
            // Models sometimes add spaces inside the brackets.
            let loose = format!(
                r"\[\s*\[\s*{}\s*\]\s*\]",
                regex::escape(p.token.trim_matches(|c: char| c == '[' || c == ']'))
            );
            match Regex::new(&loose) {
                Ok(re) => out = re.replace_all(&out, NoExpand(&replacement)).into_owned(),
                Err(e) => warn!("Could not restore {}: {}", p.token, e),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary() -> Vec<GlossaryEntry> {
        vec![
            GlossaryEntry {
                term: "LensPro".to_string(),
                translations: BTreeMap::new(),
            },
            GlossaryEntry {
                term: "image sensor".to_string(),
                translations: [("de".to_string(), "Bildsensor".to_string())]
                    .into_iter()
                    .collect(),
            },
            GlossaryEntry {
                term: "sensor".to_string(),
                translations: BTreeMap::new(),
            },
        ]
    }

    #[test]
    fn test_protect_replaces_longest_first() {
        let (text, placeholders) =
            protect("The LensPro has a new Image Sensor.", &glossary());
        assert_eq!(text, "The [[T1]] has a new [[T0]].");
        assert_eq!(placeholders.len(), 2);
        assert_eq!(placeholders[0].original, "Image Sensor");
        assert_eq!(placeholders[1].original, "LensPro");
    }

    #[test]
    fn test_restore_uses_target_translation_or_original() {
        let g = glossary();
        let (text, placeholders) = protect("LensPro image sensor", &g);
        assert_eq!(
            restore(&text, &placeholders, &g, Language::De),
            "LensPro Bildsensor"
        );
        assert_eq!(
            restore(&text, &placeholders, &g, Language::Ja),
            "LensPro image sensor"
        );
    }

    #[test]
    fn test_restore_tolerates_spaced_tokens() {
        let g = glossary();
        let (_, placeholders) = protect("LensPro", &g);
        assert_eq!(
            restore("Die [ [T0] ] ist da", &placeholders, &g, Language::De),
            "Die LensPro ist da"
        );
    }

    #[test]
    fn test_no_glossary_is_identity() {
        let (text, placeholders) = protect("Hello", &[]);
        assert_eq!(text, "Hello");
        assert!(placeholders.is_empty());
    }
}
