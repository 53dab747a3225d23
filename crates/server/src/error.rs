use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chunkbox_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Errors that can occur when running the Chunkbox server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener or reading templates).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk store error surfaced through a handler.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The requested resource does not exist or the request was malformed
    /// in a way that should look like a missing resource.
    #[error("not found")]
    NotFound,
}

impl ServerError {
    /// The status code this error maps to.
    ///
    /// Missing and expired chunks, as well as lookups with unusable
    /// identifiers, all collapse into `404`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound
            | Self::Store(StoreError::NotFound | StoreError::InvalidArgument(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::Persistence(_))
            | Self::Config(_)
            | Self::Io(_)
            | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server faults are logged in full; the client only sees the
        // canonical reason phrase.
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}
