//! CLI error types.

use marquee_config::ConfigError;
use marquee_data::DataError;
use marquee_deploy::{BuildError, PublishError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Data(#[from] DataError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Server(String),

    #[error("Aborted: {0}")]
    Aborted(String),
}
