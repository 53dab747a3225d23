pub mod chunks;
pub mod health;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use chunkbox_store::ChunkStore;

use crate::error::ServerError;
use crate::templates::TemplateCache;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The chunk store backend.
    pub store: Arc<dyn ChunkStore>,
    /// Page templates, compiled once at startup.
    pub templates: Arc<TemplateCache>,
    /// Directory served under `/static/` (not served when `None`).
    pub static_path: Option<String>,
}

/// Build the Axum router with all routes and middleware.
///
/// Middleware order, outermost first: request logging, security headers,
/// routes.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(chunks::home))
        .route("/chunkbox/view", get(chunks::view))
        .route("/chunkbox/create", post(chunks::create))
        .route("/health", get(health::health));

    if let Some(path) = state.static_path.as_ref() {
        router = router.nest_service("/static", ServeDir::new(path));
    }

    router
        .fallback(not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::secure_headers))
        .layer(axum::middleware::from_fn(middleware::log_request))
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}
