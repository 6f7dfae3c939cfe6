//! Live data endpoint.
//!
//! `GET /live-data/<identifier>.json` re-reads the dataset's CSV on every
//! request.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::error::ServerError;
use crate::handlers::fresh_response;
use crate::state::AppState;

const JSON: &str = "application/json";

/// Handle GET /live-data/{file}.
pub(crate) async fn get_live_data(
    Path(file): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = format!("/live-data/{file}");
    let Some(identifier) = file.strip_suffix(".json") else {
        return Err(ServerError::NotFound(path));
    };

    let json = state
        .site
        .dataset_json(identifier)
        .map_err(|e| ServerError::site(path, e))?;

    Ok(fresh_response(json.into_bytes(), JSON, &headers))
}
