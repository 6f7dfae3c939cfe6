//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use marquee_site::PAGES;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// Every registry entry is mounted at its path, public or not.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/live-data/{file}", get(handlers::data::get_live_data))
        .route("/less/{filename}", get(handlers::less::get_less));

    for entry in PAGES {
        router = router.route(
            entry.path,
            get(
                move |State(state): State<Arc<AppState>>, headers: HeaderMap| async move {
                    handlers::pages::render_entry(entry, &state, &headers)
                },
            ),
        );
    }

    router
        .merge(static_files::static_router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
