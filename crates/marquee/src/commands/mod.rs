//! CLI command implementations.

pub(crate) mod awards;
pub(crate) mod data;
pub(crate) mod deploy;
pub(crate) mod render;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use marquee_config::{CliSettings, Config};

pub(crate) use awards::{BuildAwardsArgs, DeployAwardsArgs};
pub(crate) use data::DataArgs;
pub(crate) use deploy::{DeployArgs, DestroyArgs};
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Configuration file selection shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover marquee.toml).
    #[arg(short, long, env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    pub(crate) fn load(&self, settings: Option<&CliSettings>) -> Result<Config, CliError> {
        let config = Config::load(self.config.as_deref(), settings)?;
        match &config.config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Loaded configuration"),
            None => tracing::debug!("No marquee.toml found, using defaults"),
        }
        Ok(config)
    }
}
