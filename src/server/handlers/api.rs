//! Read-only API endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::super::AppState;
use super::helpers::{resolve_language, ApiError, LangParams};
use crate::content::normalize_slug;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Assembled segments of a page.
pub async fn api_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = normalize_slug(&slug);
    let language = resolve_language(params.lang.as_deref(), state.settings.default_language);
    let segments = state.assembler.assemble(&slug, language).await?;

    Ok(Json(json!({
        "page": slug,
        "language": language,
        "segments": segments,
    })))
}

/// Registry entries of a page, including soft-deleted ones.
pub async fn api_registry(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = normalize_slug(&slug);
    let entries = state.editor.registry().entries(&slug).await?;
    Ok(Json(json!({
        "page": slug,
        "entries": entries,
    })))
}

/// Parameters for alt text lookup.
#[derive(Debug, Deserialize)]
pub struct AltTextParams {
    pub url: String,
    pub bucket: Option<String>,
    pub lang: Option<String>,
}

/// Alt text of an image URL. Unknown images yield an empty string.
pub async fn api_alt_text(
    State(state): State<AppState>,
    Query(params): Query<AltTextParams>,
) -> impl IntoResponse {
    let language = resolve_language(params.lang.as_deref(), state.settings.default_language);
    let bucket = params
        .bucket
        .as_deref()
        .unwrap_or(&state.settings.default_bucket);
    let alt_text = state.assets.load_alt_text(&params.url, bucket, language).await;

    Json(json!({
        "url": params.url,
        "language": language,
        "alt_text": alt_text,
    }))
}
