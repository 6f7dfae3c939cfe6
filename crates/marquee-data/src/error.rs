//! Error types for dataset and feed transformation.

use std::path::PathBuf;

/// Error returned while loading a dataset or classifying an awards feed.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The dataset CSV does not exist.
    #[error("Dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No column layout is registered for the identifier.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// A data row is shorter than the layout requires.
    #[error("Row on line {line} has {found} columns, layout requires {required}")]
    MissingColumns {
        /// 1-based line number in the source file.
        line: u64,
        /// Columns the layout reads.
        required: usize,
        /// Columns present in the row.
        found: usize,
    },

    /// The CSV reader rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The awards feed does not have the expected shape.
    #[error("Malformed awards feed: {0}")]
    Feed(String),
}

impl DataError {
    /// Whether this error means "nothing to serve" rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnknownDataset(_))
    }
}
