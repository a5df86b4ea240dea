//! Web server for published pages and the content API.
//!
//! Provides:
//! - Rendered pages per language with structured data in the head
//! - Assembled segment JSON and registry listings
//! - Token-protected admin endpoints for segment and mapping edits
//! - Public blob serving under the storage URL prefix

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::content::{AssetResolver, PageAssembler, PageEditor};
use crate::render::Renderer;
use crate::repository::DbContext;
use crate::storage::LocalBlobStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub ctx: DbContext,
    pub assembler: PageAssembler,
    pub renderer: Renderer,
    pub editor: PageEditor,
    pub assets: AssetResolver,
    pub store: Arc<LocalBlobStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build state around an open database context.
    pub fn with_context(ctx: DbContext, settings: Settings) -> Self {
        let assets = AssetResolver::new(ctx.file_mappings());
        Self {
            assembler: PageAssembler::new(ctx.pages()),
            renderer: Renderer::new(assets.clone(), &settings.default_bucket),
            editor: PageEditor::new(&ctx),
            assets,
            store: Arc::new(LocalBlobStore::new(
                settings.storage_dir.clone(),
                &settings.public_base_url,
            )),
            settings: Arc::new(settings),
            ctx,
        }
    }

    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context_validated().await?;
        Ok(Self::with_context(ctx, settings.clone()))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    if state.settings.admin_token.is_none() {
        tracing::warn!("No admin token configured, admin API is disabled");
    }
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::models::{Language, PageContent, PAGE_SEGMENTS_KEY, TAB_ORDER_KEY};

    const TOKEN: &str = "s3cret";

    async fn setup_test_app(admin_token: Option<&str>) -> (axum::Router, AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();

        let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.admin_token = admin_token.map(str::to_string);
        settings.public_base_url = "http://localhost".to_string();

        let state = AppState::with_context(ctx, settings);
        (create_router(state.clone()), state, dir)
    }

    async fn seed_home(state: &AppState) {
        let pages = state.ctx.pages();
        pages
            .set(&PageContent::json(
                "home",
                PAGE_SEGMENTS_KEY,
                Language::En,
                &json!([
                    {"id": 1, "type": "text", "data": {"title": "Welcome", "ko": {"title": "환영합니다"}}},
                    {"id": 2, "type": "faq", "data": {"items": [{"question": "Q", "answer": "A"}]}},
                    {"id": 3, "type": "text", "data": {"title": "Hidden"}}
                ]),
            ))
            .await
            .unwrap();
        pages
            .set(&PageContent::json("home", TAB_ORDER_KEY, Language::En, &json!(["2", "1"])))
            .await
            .unwrap();
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _state, _dir) = setup_test_app(None).await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_page_renders_in_tab_order() {
        let (app, state, _dir) = setup_test_app(None).await;
        seed_home(&state).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/pages/home?lang=ko")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        let faq = html.find(r#"id="segment-2""#).unwrap();
        let text = html.find(r#"id="segment-1""#).unwrap();
        assert!(faq < text);
        assert!(html.contains("환영합니다"));
        assert!(!html.contains("Hidden"));
        assert!(html.contains("application/ld+json"));
        assert!(html.contains(r#"<html lang="ko">"#));
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let (app, _state, _dir) = setup_test_app(None).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/pages/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_page_returns_segments() {
        let (app, state, _dir) = setup_test_app(None).await;
        seed_home(&state).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/pages/home?lang=en")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["language"], "en");
        let ids: Vec<i64> = json["segments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_admin_disabled_without_token() {
        let (app, _state, _dir) = setup_test_app(None).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/segments")
                    .header("content-type", "application/json")
                    .header("x-admin-token", "anything")
                    .body(Body::from(r#"{"page":"home","type":"text","data":{}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_rejects_wrong_token() {
        let (app, _state, _dir) = setup_test_app(Some(TOKEN)).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/segments")
                    .header("content-type", "application/json")
                    .header("x-admin-token", "wrong")
                    .body(Body::from(r#"{"page":"home","type":"text","data":{}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_add_and_delete_segment() {
        let (app, state, _dir) = setup_test_app(Some(TOKEN)).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/segments")
                    .header("content-type", "application/json")
                    .header("x-admin-token", TOKEN)
                    .body(Body::from(
                        r#"{"page":"about","type":"text","data":{"title":"About us"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["id"].as_i64().unwrap() as i32;

        let segments = state.assembler.assemble("about", Language::En).await.unwrap();
        assert_eq!(segments.len(), 1);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/segments/{}", id))
                    .header("x-admin-token", TOKEN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let segments = state.assembler.assemble("about", Language::En).await.unwrap();
        assert!(segments.is_empty());
        let entry = state.ctx.registry().get(id).await.unwrap().unwrap();
        assert!(entry.deleted);
    }

    #[tokio::test]
    async fn test_admin_unknown_type_is_bad_request() {
        let (app, _state, _dir) = setup_test_app(Some(TOKEN)).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/segments")
                    .header("content-type", "application/json")
                    .header("x-admin-token", TOKEN)
                    .body(Body::from(r#"{"page":"home","type":"carousel","data":{}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mapping_then_alt_text_lookup() {
        let (app, _state, _dir) = setup_test_app(Some(TOKEN)).await;
        let url = "http://localhost/storage/v1/object/public/page-images/news/a.jpg";

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/mappings")
                    .header("content-type", "application/json")
                    .header("x-admin-token", TOKEN)
                    .body(Body::from(
                        json!({"url": url, "segment_id": 5, "alt_text": "A lens", "lang": "en"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mapping = body_json(response).await;
        assert_eq!(mapping["segment_ids"], json!(["5"]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/alt-text?url={}&lang=de",
                        urlencoding::encode(url)
                    ))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["alt_text"], "A lens");
    }

    #[tokio::test]
    async fn test_storage_serves_blobs() {
        let (app, state, _dir) = setup_test_app(None).await;
        use crate::storage::BlobStore;
        state
            .store
            .put("page-images", "logo.txt", b"hello")
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/storage/v1/object/public/page-images/logo.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "hello");
    }
}
