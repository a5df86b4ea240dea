//! Translation client configuration.

use serde::{Deserialize, Serialize};

use super::glossary::GlossaryEntry;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
}

impl TranslationProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

/// Configuration for the translation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,
    /// API endpoint without the request path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key for OpenAI-compatible providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Terms that must be translated consistently (or kept as is).
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            glossary: Vec::new(),
        }
    }
}

impl TranslationConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `TRANSLATE_PROVIDER`: "ollama" (default), "openai", "groq", or "together"
    /// - `TRANSLATE_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `TRANSLATE_API_KEY`: API key for OpenAI-compatible providers
    /// - `TRANSLATE_MODEL`: Model name
    pub fn with_env_overrides(mut self) -> Self {
        let explicit_provider = std::env::var("TRANSLATE_PROVIDER").ok();
        if let Some(provider) = explicit_provider
            .as_deref()
            .and_then(TranslationProvider::from_str)
        {
            self.provider = provider;
        }

        if let Ok(endpoint) = std::env::var("TRANSLATE_ENDPOINT") {
            self.endpoint = endpoint;
        } else if let Some(provider) = explicit_provider.as_deref() {
            match provider.to_lowercase().as_str() {
                "groq" => self.endpoint = "https://api.groq.com/openai".to_string(),
                "openai" => self.endpoint = "https://api.openai.com".to_string(),
                "together" => self.endpoint = "https://api.together.xyz".to_string(),
                _ => {}
            }
        }

        if let Ok(key) = std::env::var("TRANSLATE_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("TRANSLATE_MODEL") {
            self.model = model;
        }
        self
    }
}
