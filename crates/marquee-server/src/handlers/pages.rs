//! Registry entry handler.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;
use marquee_site::{IncludeCache, PageEntry};

use crate::error::ServerError;
use crate::handlers::fresh_response;
use crate::state::AppState;

/// Render a registry entry with a fresh linking include cache.
pub(crate) fn render_entry(
    entry: &'static PageEntry,
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let mut cache = IncludeCache::linking();
    let bytes = state
        .site
        .render(entry, &state.options, &mut cache)
        .map_err(|e| ServerError::site(entry.path, e))?;

    tracing::debug!(page = entry.name, bytes = bytes.len(), "Rendered page");
    Ok(fresh_response(bytes, entry.content_type, headers))
}
