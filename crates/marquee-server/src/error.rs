//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_site::SiteError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Nothing is served at the given path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Producing the response failed.
    #[error("Failed to produce {path}: {source}")]
    Site {
        path: String,
        #[source]
        source: SiteError,
    },
}

impl ServerError {
    /// Classify a site error for `path`: missing inputs become 404s.
    pub(crate) fn site(path: impl Into<String>, source: SiteError) -> Self {
        let path = path.into();
        if source.is_not_found() {
            Self::NotFound(path)
        } else {
            Self::Site { path, source }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            Self::Site { path, source } => {
                tracing::error!(path = %path, error = %source, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": source.to_string(), "path": path}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
