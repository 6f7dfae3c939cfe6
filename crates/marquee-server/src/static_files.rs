//! Static file serving from `www/`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use marquee_site::SiteError;
use percent_encoding::percent_decode_str;

use crate::error::ServerError;
use crate::handlers::fresh_response;
use crate::state::AppState;

/// Router serving anything not matched by another route from `www/`.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_asset)
}

async fn serve_asset(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let uri_path = req.uri().path();
    let path = percent_decode_str(uri_path.trim_start_matches('/')).decode_utf8_lossy();

    match state.site.static_files().get(&path) {
        Ok(asset) => fresh_response(asset.bytes, &asset.content_type, req.headers()),
        Err(e) => ServerError::site(uri_path, SiteError::from(e)).into_response(),
    }
}
