use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use chunkbox_server::api::AppState;
use chunkbox_server::templates::TemplateCache;
use chunkbox_store::{Chunk, ChunkStore, NewChunk, StoreError};
use chunkbox_store_memory::MemoryChunkStore;

// -- Failing store --------------------------------------------------------

/// Store whose every operation fails with a backend error carrying
/// internal detail that must never reach the client.
struct BrokenStore;

const INTERNAL_DETAIL: &str = "connection refused: 10.0.0.7:5432";

#[async_trait]
impl ChunkStore for BrokenStore {
    async fn insert(&self, _chunk: NewChunk) -> Result<i64, StoreError> {
        Err(StoreError::Persistence(INTERNAL_DETAIL.into()))
    }

    async fn get(&self, _id: i64) -> Result<Chunk, StoreError> {
        Err(StoreError::Persistence(INTERNAL_DETAIL.into()))
    }

    async fn latest(&self) -> Result<Vec<Chunk>, StoreError> {
        Err(StoreError::Persistence(INTERNAL_DETAIL.into()))
    }
}

// -- Helpers --------------------------------------------------------------

fn ui_path(sub: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../ui")
        .join(sub)
        .to_string_lossy()
        .into_owned()
}

fn build_state(store: Arc<dyn ChunkStore>) -> AppState {
    let templates = TemplateCache::load(ui_path("html")).expect("templates should load");
    AppState {
        store,
        templates: Arc::new(templates),
        static_path: Some(ui_path("static")),
    }
}

fn build_app(store: Arc<dyn ChunkStore>) -> axum::Router {
    chunkbox_server::api::router(build_state(store))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = build_app(Arc::new(MemoryChunkStore::new()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn home_lists_latest_chunks() {
    let store = Arc::new(MemoryChunkStore::new());
    store
        .insert(NewChunk::new("On BhagvadGita", "content", 7))
        .await
        .unwrap();
    store
        .insert(NewChunk::new("Already gone", "content", 0))
        .await
        .unwrap();

    let response = build_app(store).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("On BhagvadGita"));
    assert!(body.contains("/chunkbox/view?id=1"));
    assert!(!body.contains("Already gone"), "expired chunks must not be listed");
}

#[tokio::test]
async fn home_without_chunks_shows_placeholder() {
    let response = build_app(Arc::new(MemoryChunkStore::new()))
        .oneshot(get("/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("nothing to see here"));
}

#[tokio::test]
async fn view_renders_chunk() {
    let store = Arc::new(MemoryChunkStore::new());
    let id = store
        .insert(NewChunk::new("Title <b>", "line one\nline two", 7))
        .await
        .unwrap();

    let response = build_app(store)
        .oneshot(get(&format!("/chunkbox/view?id={id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let body = body_string(response).await;
    assert!(body.contains("Title &lt;b&gt;"), "title must be HTML-escaped");
    assert!(body.contains("line one\nline two"));
    assert!(body.contains(&format!("#{id}")));
}

#[tokio::test]
async fn view_with_invalid_id_returns_404() {
    let app = build_app(Arc::new(MemoryChunkStore::new()));

    for uri in [
        "/chunkbox/view",
        "/chunkbox/view?id=",
        "/chunkbox/view?id=0",
        "/chunkbox/view?id=-1",
        "/chunkbox/view?id=abc",
        "/chunkbox/view?id=1&id=2",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");
    }
}

#[tokio::test]
async fn missing_and_expired_chunks_look_the_same() {
    let store = Arc::new(MemoryChunkStore::new());
    let expired = store
        .insert(NewChunk::new("secret", "expired content", 0))
        .await
        .unwrap();
    let app = build_app(store);

    let expired_response = app
        .clone()
        .oneshot(get(&format!("/chunkbox/view?id={expired}")))
        .await
        .unwrap();
    let missing_response = app.oneshot(get("/chunkbox/view?id=999")).await.unwrap();

    assert_eq!(expired_response.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing_response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_string(expired_response).await,
        body_string(missing_response).await
    );
}

#[tokio::test]
async fn create_redirects_to_new_chunk() {
    let store = Arc::new(MemoryChunkStore::new());
    let app = build_app(Arc::clone(&store) as Arc<dyn ChunkStore>);

    let response = app
        .oneshot(post_form(
            "/chunkbox/create",
            "title=On+BhagvadGita&content=The+soul+who+meditates%0Aon+the+Self&expires=7",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION].to_str().unwrap(),
        "/chunkbox/view?id=1"
    );

    let chunk = store.get(1).await.unwrap();
    assert_eq!(chunk.title, "On BhagvadGita");
    assert_eq!(chunk.content, "The soul who meditates\non the Self");
    assert_eq!(chunk.expires, chunk.created + chrono::Duration::days(7));
}

#[tokio::test]
async fn create_with_invalid_form_rerenders_with_errors() {
    let store = Arc::new(MemoryChunkStore::new());
    let app = build_app(Arc::clone(&store) as Arc<dyn ChunkStore>);

    let response = app
        .oneshot(post_form(
            "/chunkbox/create",
            "title=&content=kept+text&expires=-1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("This field cannot be blank"));
    assert!(body.contains("This field must equal 1, 7 or 365"));
    assert!(body.contains("kept text"), "submitted values are preserved");
    assert!(store.is_empty(), "nothing is inserted for an invalid form");
}

#[tokio::test]
async fn create_without_expiry_is_rejected() {
    let store = Arc::new(MemoryChunkStore::new());
    let app = build_app(Arc::clone(&store) as Arc<dyn ChunkStore>);

    let response = app
        .oneshot(post_form("/chunkbox/create", "title=t&content=c"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_string(response).await.contains("This field must equal 1, 7 or 365"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn create_only_accepts_post() {
    let app = build_app(Arc::new(MemoryChunkStore::new()));

    let response = app.oneshot(get("/chunkbox/create")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response.headers()[header::ALLOW].to_str().unwrap();
    assert!(allow.contains("POST"), "allow header was {allow}");
}

#[tokio::test]
async fn persistence_failures_are_generic_500s() {
    let app = build_app(Arc::new(BrokenStore));

    let requests = [
        get("/"),
        get("/chunkbox/view?id=1"),
        post_form("/chunkbox/create", "title=t&content=c&expires=1"),
    ];

    for request in requests {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_string(response).await;
        assert_eq!(body, "Internal Server Error");
        assert!(!body.contains(INTERNAL_DETAIL));
    }
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let response = build_app(Arc::new(MemoryChunkStore::new()))
        .oneshot(get("/no/such/page"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not Found");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = build_app(Arc::new(MemoryChunkStore::new()));

    for uri in ["/", "/no/such/page"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        let headers = response.headers();
        assert!(
            headers[header::CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .starts_with("default-src 'self'")
        );
        assert_eq!(headers[header::REFERRER_POLICY], "origin-when-cross-origin");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "deny");
        assert_eq!(headers[header::X_XSS_PROTECTION], "0");
    }
}

#[tokio::test]
async fn static_assets_are_served() {
    let response = build_app(Arc::new(MemoryChunkStore::new()))
        .oneshot(get("/static/css/main.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("box-sizing"));
}
