//! Admin endpoint handlers. Every handler checks the admin token first.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::super::AppState;
use super::helpers::{require_admin, resolve_language, ApiError};
use crate::content::normalize_slug;
use crate::models::SegmentId;

/// Body of a segment creation request.
#[derive(Debug, Deserialize)]
pub struct CreateSegmentRequest {
    pub page: String,
    pub lang: Option<String>,
    #[serde(rename = "type")]
    pub segment_type: String,
    #[serde(default)]
    pub data: Value,
}

/// Create a segment and append it to the page.
pub async fn create_segment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSegmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let page = normalize_slug(&req.page);
    let language = resolve_language(req.lang.as_deref(), state.settings.default_language);
    let segment = state
        .editor
        .add_segment(&page, language, &req.segment_type, req.data)
        .await?;

    Ok((StatusCode::CREATED, Json(segment)))
}

/// Remove a segment from its page in every language and soft-delete it.
pub async fn delete_segment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(segment_id): Path<SegmentId>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let entry = state
        .editor
        .registry()
        .get(segment_id)
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                format!("Segment {} is not registered", segment_id),
            )
        })?;
    let removed = state
        .editor
        .remove_segment(&entry.page_slug, segment_id)
        .await?;

    Ok(Json(json!({
        "segment_id": segment_id,
        "page": entry.page_slug,
        "removed": removed,
    })))
}

/// Body of a mapping update. Either part is optional.
#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    pub url: String,
    pub bucket: Option<String>,
    pub segment_id: Option<SegmentId>,
    pub alt_text: Option<String>,
    pub lang: Option<String>,
}

/// Link an image to a segment and/or set its alt text.
pub async fn update_mapping(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MappingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    if req.segment_id.is_none() && req.alt_text.is_none() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Nothing to update: give segment_id or alt_text",
        ));
    }

    let bucket = req
        .bucket
        .as_deref()
        .unwrap_or(&state.settings.default_bucket);

    let mut mapping = None;
    if let Some(segment_id) = req.segment_id {
        mapping = Some(
            state
                .assets
                .update_segment_mapping(&req.url, segment_id, bucket)
                .await?,
        );
    }
    if let Some(ref text) = req.alt_text {
        let language = resolve_language(req.lang.as_deref(), state.settings.default_language);
        mapping = Some(
            state
                .assets
                .set_alt_text(&req.url, bucket, language, text)
                .await?,
        );
    }

    info!("Updated mapping for {}", req.url);
    Ok(Json(mapping))
}
