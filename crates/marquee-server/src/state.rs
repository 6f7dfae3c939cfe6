//! Application state.

use marquee_site::{RenderOptions, Site};

/// State shared across all handlers.
pub(crate) struct AppState {
    pub(crate) site: Site,
    /// Options every request renders with.
    pub(crate) options: RenderOptions,
}
