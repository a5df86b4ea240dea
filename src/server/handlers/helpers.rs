//! Helper types and utility functions for handlers.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::super::AppState;
use crate::content::ContentError;
use crate::models::Language;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Query params selecting a language.
#[derive(Debug, Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

/// Requested language, or the site default when absent or unknown.
pub fn resolve_language(param: Option<&str>, default: Language) -> Language {
    param.and_then(Language::from_str).unwrap_or(default)
}

/// JSON error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        let status = match &e {
            ContentError::SegmentNotFound(_) => StatusCode::NOT_FOUND,
            ContentError::UnknownSegmentType(_)
            | ContentError::InvalidJson { .. }
            | ContentError::UnsupportedUrl(_) => StatusCode::BAD_REQUEST,
            ContentError::Database(_) | ContentError::Storage(_) => {
                tracing::error!("Request failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Check the admin token header against the configured token.
///
/// Without a configured token every admin request is refused.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if state.settings.admin_token.is_none() {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Admin API is disabled",
        ));
    }

    let given = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if state.settings.admin_allowed(given) {
        Ok(())
    } else {
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid admin token"))
    }
}
