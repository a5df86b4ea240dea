//! LLM translation of page content.
//!
//! Supports Ollama (`/api/generate`) and OpenAI-compatible
//! (`/v1/chat/completions`) endpoints. Glossary terms are protected with
//! placeholders around each call.

mod config;
pub mod glossary;

pub use config::{TranslationConfig, TranslationProvider};
pub use glossary::GlossaryEntry;

use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::{localize, ContentError};
use crate::models::{ContentType, Language, PageContent, PAGE_SEGMENTS_KEY};
use crate::repository::DbContext;

/// Errors that can occur during translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Page {0} has no segments to translate")]
    NothingToTranslate(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl From<crate::repository::DieselError> for TranslateError {
    fn from(e: crate::repository::DieselError) -> Self {
        Self::Content(ContentError::Database(e))
    }
}

/// Something that can translate plain text.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_text(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslateError>;
}

const PROMPT: &str = r#"Translate the following website text from {from} to {to}.
Keep placeholders like [[T0]] exactly as they are. Keep line breaks.
Respond with ONLY the translation, no explanations or quotes.

Text:
{text}"#;

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP translation client.
pub struct TranslationClient {
    config: TranslationConfig,
    client: Client,
}

impl TranslationClient {
    pub fn new(config: TranslationConfig) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslateError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    async fn call(&self, prompt: String) -> Result<String, TranslateError> {
        match self.config.provider {
            TranslationProvider::Ollama => self.call_ollama(prompt).await,
            TranslationProvider::OpenAI => self.call_openai(prompt).await,
        }
    }

    async fn call_ollama(&self, prompt: String) -> Result<String, TranslateError> {
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslateError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;
        Ok(body.response)
    }

    async fn call_openai(&self, prompt: String) -> Result<String, TranslateError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );
        let mut req = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| TranslateError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TranslateError::Parse("No choices in response".to_string()))
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate_text(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslateError> {
        if from == to || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let glossary = &self.config.glossary;
        let (protected, placeholders) = glossary::protect(text, glossary);
        let prompt = PROMPT
            .replace("{from}", from.display_name())
            .replace("{to}", to.display_name())
            .replace("{text}", &protected);

        debug!("Translating {} chars {} -> {}", text.len(), from, to);
        let response = self.call(prompt).await?;
        let translated = response.trim();
        if translated.is_empty() {
            return Err(TranslateError::Parse("Empty translation".to_string()));
        }

        Ok(glossary::restore(translated, &placeholders, glossary, to))
    }
}

/// Whether a field holds data that must not be translated.
fn is_untranslatable_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    matches!(lower.as_str(), "id" | "type" | "slug" | "icon" | "date")
        || lower.ends_with("url")
        || lower.contains("link")
        || lower.contains("href")
        || lower == "src"
        || Language::ALL.iter().any(|l| l.as_str() == lower)
}

fn looks_like_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with('/')
}

/// Translate every string leaf of a JSON value in place.
///
/// URL, link, id and type fields and URL-looking strings are left alone.
pub fn translate_json<'a>(
    translator: &'a dyn Translator,
    value: &'a mut Value,
    from: Language,
    to: Language,
) -> BoxFuture<'a, Result<(), TranslateError>> {
    async move {
        match value {
            Value::String(s) if !looks_like_url(s) => {
                *s = translator.translate_text(s, from, to).await?;
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    translate_json(translator, item, from, to).await?;
                }
            }
            Value::Object(map) => {
                for (key, item) in map.iter_mut() {
                    if !is_untranslatable_key(key) {
                        translate_json(translator, item, from, to).await?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
    .boxed()
}

/// Translate a page's segments and store each result as a `data[to]` overlay.
///
/// Overlays are written into the source language's `page_segments`, and into
/// the target language's own blob when one exists. Returns the number of
/// segments translated.
pub async fn translate_page(
    ctx: &DbContext,
    translator: &dyn Translator,
    page_slug: &str,
    from: Language,
    to: Language,
) -> Result<usize, TranslateError> {
    let pages = ctx.pages();
    let source = pages
        .get(page_slug, PAGE_SEGMENTS_KEY, from, ContentType::Json)
        .await?
        .ok_or_else(|| TranslateError::NothingToTranslate(page_slug.to_string()))?;
    let mut source_segments = parse_array(&source)?;

    let mut overlays = Vec::new();
    for element in source_segments.iter_mut() {
        let Some(id) = element.get("id").cloned() else {
            continue;
        };
        let Some(data) = element.get("data").filter(|d| d.is_object()) else {
            continue;
        };

        let mut translated = localize(data, from);
        translate_json(translator, &mut translated, from, to).await?;
        if let Some(map) = element.get_mut("data").and_then(Value::as_object_mut) {
            map.insert(to.as_str().to_string(), translated.clone());
        }
        overlays.push((id, translated));
    }

    pages
        .set(&PageContent::json(
            page_slug,
            PAGE_SEGMENTS_KEY,
            from,
            &Value::Array(source_segments),
        ))
        .await?;

    if let Some(target) = pages
        .get(page_slug, PAGE_SEGMENTS_KEY, to, ContentType::Json)
        .await?
    {
        match parse_array(&target) {
            Ok(mut target_segments) => {
                for element in target_segments.iter_mut() {
                    let overlay = overlays
                        .iter()
                        .find(|(id, _)| element.get("id") == Some(id))
                        .map(|(_, o)| o.clone());
                    if let (Some(overlay), Some(map)) = (
                        overlay,
                        element.get_mut("data").and_then(Value::as_object_mut),
                    ) {
                        map.insert(to.as_str().to_string(), overlay);
                    }
                }
                pages
                    .set(&PageContent::json(
                        page_slug,
                        PAGE_SEGMENTS_KEY,
                        to,
                        &Value::Array(target_segments),
                    ))
                    .await?;
            }
            Err(e) => warn!("Leaving {} segments of {} untouched: {}", to, page_slug, e),
        }
    }

    info!(
        "Translated {} segments of {} ({} -> {})",
        overlays.len(),
        page_slug,
        from,
        to
    );
    Ok(overlays.len())
}

fn parse_array(row: &PageContent) -> Result<Vec<Value>, TranslateError> {
    match row.parse_json() {
        Ok(Value::Array(values)) => Ok(values),
        Ok(_) => Err(TranslateError::Parse(format!(
            "{} of {} is not an array",
            row.section_key, row.page_slug
        ))),
        Err(source) => Err(ContentError::InvalidJson {
            key: row.section_key.clone(),
            source,
        }
        .into()),
    }
}
