//! On-demand LESS compilation.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::error::ServerError;
use crate::handlers::fresh_response;
use crate::state::AppState;

const CSS: &str = "text/css; charset=utf-8";

/// Handle GET /less/{filename}.
pub(crate) async fn get_less(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let css = state
        .site
        .compile_less(&filename)
        .map_err(|e| ServerError::site(format!("/less/{filename}"), e))?;

    Ok(fresh_response(css.into_bytes(), CSS, &headers))
}
