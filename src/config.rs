//! Configuration management for sitecms using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Language;
use crate::repository::util::{is_postgres_url, validate_database_url};
use crate::repository::DbContext;
use crate::translate::TranslationConfig;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "sitecms.db";

/// Subdirectory of the data dir holding blob buckets.
pub const STORAGE_SUBDIR: &str = "storage";

/// Bucket page images are uploaded to.
pub const DEFAULT_BUCKET: &str = "page-images";

/// Default address used to build public blob URLs.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3030";

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Directory holding one subdirectory per bucket.
    pub storage_dir: PathBuf,
    /// Base URL public blob URLs are built from.
    pub public_base_url: String,
    pub default_bucket: String,
    /// Language served when a request names none.
    pub default_language: Language,
    /// Token required by admin endpoints. `None` disables them.
    pub admin_token: Option<String>,
    pub translation: TranslationConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // ~/.local/share/sitecms, falling back to the home dir, then CWD
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitecms");

        Self {
            storage_dir: data_dir.join(STORAGE_SUBDIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            default_bucket: DEFAULT_BUCKET.to_string(),
            default_language: Language::En,
            admin_token: None,
            translation: TranslationConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            storage_dir: data_dir.join(STORAGE_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Check if using PostgreSQL (vs SQLite).
    pub fn is_postgres(&self) -> bool {
        self.database_url
            .as_ref()
            .is_some_and(|url| is_postgres_url(url))
    }

    /// Get the full path to the database (for SQLite file-based databases).
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure data and storage directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.storage_dir)?;
        Ok(())
    }

    /// Create a database context from these settings.
    pub fn create_db_context(&self) -> Result<DbContext, diesel::result::Error> {
        if self.database_url.is_some() {
            DbContext::from_url(&self.database_url())
        } else {
            Ok(DbContext::from_sqlite_path(&self.database_path()))
        }
    }

    /// Create a database context and check that it answers.
    pub async fn create_db_context_validated(&self) -> anyhow::Result<DbContext> {
        let ctx = self.create_db_context()?;
        ctx.test_connection().await.map_err(|e| {
            anyhow::anyhow!(
                "Cannot connect to database {}: {}",
                crate::repository::util::redact_url_password(&self.database_url()),
                e
            )
        })?;
        Ok(ctx)
    }

    /// Whether an admin request carrying `token` may proceed.
    pub fn admin_allowed(&self, token: Option<&str>) -> bool {
        match (&self.admin_token, token) {
            (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
            _ => false,
        }
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if let Some(url) = env_value("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(token) = env_value("SITECMS_ADMIN_TOKEN") {
            self.admin_token = Some(token);
        }
        if let Some(base) = env_value("SITECMS_PUBLIC_BASE_URL") {
            self.public_base_url = base;
        }
        self.translation = std::mem::take(&mut self.translation).with_env_overrides();
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Configuration file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationConfig>,

    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers sitecms config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("sitecms").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("{}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(e) => {
                debug!("No config file found: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.storage_dir = settings.data_dir.join(STORAGE_SUBDIR);
        }
        if let Some(ref database) = self.database {
            if database.contains("://") || database.starts_with("sqlite:") {
                settings.database_url = Some(database.clone());
            } else {
                settings.database_filename = database.clone();
            }
        }
        if let Some(ref storage_dir) = self.storage_dir {
            settings.storage_dir = self.resolve_path(storage_dir, base_dir);
        }
        if let Some(ref base) = self.public_base_url {
            settings.public_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(ref bucket) = self.default_bucket {
            settings.default_bucket = bucket.clone();
        }
        if let Some(ref lang) = self.default_language {
            match Language::from_str(lang) {
                Some(language) => settings.default_language = language,
                None => warn!("Unknown default_language '{}', keeping en", lang),
            }
        }
        if let Some(ref token) = self.admin_token {
            settings.admin_token = Some(token.clone());
        }
        if let Some(ref translation) = self.translation {
            settings.translation = translation.clone();
        }
    }
}

/// Load settings from an explicit config file or by discovery, then apply
/// environment overrides.
pub async fn load_settings(config_path: Option<&Path>) -> anyhow::Result<(Settings, Config)> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!(e))?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env();

    if let Some(ref url) = settings.database_url {
        validate_database_url(url).map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_by_extension() {
        let toml_config = Config::parse(
            "database = \"site.db\"\nadmin_token = \"s3cret\"\n",
            Path::new("sitecms.toml"),
        )
        .unwrap();
        assert_eq!(toml_config.database.as_deref(), Some("site.db"));
        assert_eq!(toml_config.admin_token.as_deref(), Some("s3cret"));

        let yaml_config =
            Config::parse("default_bucket: media\n", Path::new("sitecms.yaml")).unwrap();
        assert_eq!(yaml_config.default_bucket.as_deref(), Some("media"));

        let json_config = Config::parse(
            r#"{"default_language": "ko"}"#,
            Path::new("sitecms.json"),
        )
        .unwrap();
        assert_eq!(json_config.default_language.as_deref(), Some("ko"));

        assert!(Config::parse("not = [valid", Path::new("x.toml")).is_err());
    }

    #[test]
    fn test_apply_resolves_relative_paths() {
        let config = Config {
            data_dir: Some("data".to_string()),
            database: Some("site.db".to_string()),
            public_base_url: Some("https://cdn.example.com/".to_string()),
            default_language: Some("ja".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/srv/site"));

        assert_eq!(settings.data_dir, PathBuf::from("/srv/site/data"));
        assert_eq!(settings.storage_dir, PathBuf::from("/srv/site/data/storage"));
        assert_eq!(
            settings.database_path(),
            PathBuf::from("/srv/site/data/site.db")
        );
        assert_eq!(settings.public_base_url, "https://cdn.example.com");
        assert_eq!(settings.default_language, Language::Ja);
        assert!(!settings.is_postgres());
    }

    #[test]
    fn test_database_url_in_config() {
        let config = Config {
            database: Some("postgres://u:p@db/site".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/"));
        assert!(settings.is_postgres());
        assert_eq!(settings.database_url(), "postgres://u:p@db/site");
    }

    #[test]
    fn test_admin_allowed() {
        let mut settings = Settings::default();
        assert!(!settings.admin_allowed(Some("anything")));

        settings.admin_token = Some("s3cret".to_string());
        assert!(settings.admin_allowed(Some("s3cret")));
        assert!(!settings.admin_allowed(Some("wrong")));
        assert!(!settings.admin_allowed(None));
    }

    #[tokio::test]
    async fn test_load_from_path_records_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sitecms.toml");
        std::fs::write(&path, "data_dir = \"content\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));
        assert_eq!(
            config.resolve_path("content", dir.path()),
            dir.path().join("content")
        );
    }
}
