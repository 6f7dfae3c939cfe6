//! Error type for page production.

use std::path::PathBuf;

use marquee_assets::{AssetError, CompileError};
use marquee_data::DataError;

/// Error returned while producing a page or asset.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    /// Whether the failure is a missing input rather than a broken one.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Data(e) => e.is_not_found(),
            Self::Asset(AssetError::NotFound(_)) => true,
            _ => false,
        }
    }
}
