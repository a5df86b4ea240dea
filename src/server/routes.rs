//! Router configuration for the web server.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::handlers;
use super::AppState;
use crate::storage::PUBLIC_OBJECT_PREFIX;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let storage = ServeDir::new(&state.settings.storage_dir);

    Router::new()
        .route("/health", get(handlers::health))
        // Published pages
        .route("/", get(handlers::home_page))
        .route("/pages/*slug", get(handlers::page_html))
        // Read API
        .route("/api/pages/*slug", get(handlers::api_page))
        .route("/api/registry/*slug", get(handlers::api_registry))
        .route("/api/alt-text", get(handlers::api_alt_text))
        // Admin API
        .route("/api/segments", post(handlers::create_segment))
        .route("/api/segments/:segment_id", delete(handlers::delete_segment))
        .route("/api/mappings", post(handlers::update_mapping))
        // Public blobs
        .nest_service(PUBLIC_OBJECT_PREFIX, storage)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
