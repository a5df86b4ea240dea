//! Published page handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{debug, warn};

use super::super::AppState;
use super::helpers::{resolve_language, LangParams};
use crate::content::normalize_slug;
use crate::i18n::t;
use crate::models::Language;
use crate::render::{fallback_body, render_document, PageDocument, RenderedPage};

/// Flat field holding a page's document title.
const TITLE_KEY: &str = "page_title";

/// Home page.
pub async fn home_page(
    State(state): State<AppState>,
    Query(params): Query<LangParams>,
) -> impl IntoResponse {
    render_page(&state, "home", params.lang.as_deref()).await
}

/// Rendered page for a slug.
pub async fn page_html(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LangParams>,
) -> impl IntoResponse {
    render_page(&state, &slug, params.lang.as_deref()).await
}

/// Assemble and render a page.
///
/// Assembly failures still produce a page: the localized contact message
/// replaces the body.
async fn render_page(state: &AppState, slug: &str, lang: Option<&str>) -> (StatusCode, Html<String>) {
    let slug = normalize_slug(slug);
    let language = resolve_language(lang, state.settings.default_language);

    let (status, rendered) = match state.assembler.assemble(&slug, language).await {
        Ok(segments) if segments.is_empty() => {
            debug!("Page {} has nothing to render", slug);
            (
                StatusCode::NOT_FOUND,
                RenderedPage {
                    body_html: not_found_body(language),
                    ..Default::default()
                },
            )
        }
        Ok(segments) => (
            StatusCode::OK,
            state.renderer.render_page(&segments, language).await,
        ),
        Err(e) => {
            warn!("Failed to assemble {} ({}): {}", slug, language, e);
            (
                StatusCode::OK,
                RenderedPage {
                    body_html: fallback_body(language),
                    ..Default::default()
                },
            )
        }
    };

    let title = page_title(state, &slug, language).await;
    let html = render_document(&PageDocument {
        page_slug: &slug,
        title: &title,
        language,
        head_html: &rendered.head_html,
        body_html: &rendered.body_html,
    });
    (status, Html(html))
}

async fn page_title(state: &AppState, slug: &str, language: Language) -> String {
    match state.assembler.flat_fields(slug, language).await {
        Ok(fields) => fields
            .get(TITLE_KEY)
            .filter(|title| !title.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| slug.to_string()),
        Err(_) => slug.to_string(),
    }
}

fn not_found_body(language: Language) -> String {
    format!(
        r#"<section class="segment segment-not-found"><h1>{}</h1></section>"#,
        crate::utils::html_escape(&t(language, "page.not_found"))
    )
}
