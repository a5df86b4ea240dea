//! Shared helper functions for CLI commands.

use crate::config::Settings;
use crate::models::Language;
use crate::repository::DbContext;

/// Parse a language argument.
pub fn parse_language(code: &str) -> anyhow::Result<Language> {
    Language::from_str(code).ok_or_else(|| {
        let supported: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
        anyhow::anyhow!(
            "Unknown language '{}' (supported: {})",
            code,
            supported.join(", ")
        )
    })
}

/// Open the configured database, failing early when it is missing.
pub async fn open_context(settings: &Settings) -> anyhow::Result<DbContext> {
    if settings.database_url.is_none() && !settings.database_path().exists() {
        anyhow::bail!(
            "No database at {}. Run 'sitecms init' first.",
            settings.database_path().display()
        );
    }
    settings.create_db_context_validated().await
}

/// Bucket argument or the configured default.
pub fn bucket_or_default<'a>(settings: &'a Settings, bucket: Option<&'a str>) -> &'a str {
    bucket.unwrap_or(&settings.default_bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("ja").unwrap(), Language::Ja);
        let err = parse_language("fr").unwrap_err().to_string();
        assert!(err.contains("en, de, zh, ja, ko"));
    }

    #[test]
    fn test_bucket_or_default() {
        let settings = Settings::default();
        assert_eq!(bucket_or_default(&settings, None), "page-images");
        assert_eq!(bucket_or_default(&settings, Some("media")), "media");
    }
}
