//! `marquee data` command implementation.

use std::path::PathBuf;

use clap::Args;
use marquee_config::CliSettings;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the data command.
#[derive(Args)]
pub(crate) struct DataArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Dataset identifier (e.g. best-picture).
    identifier: String,

    /// Dataset directory (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl DataArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            data_dir: self.data_dir,
            ..CliSettings::default()
        };
        let config = self.config.load(Some(&cli_settings))?;

        let document =
            marquee_data::load_document(&config.paths_resolved.data_dir, &self.identifier)?;
        Output::new().data(&document.to_json()?)?;
        Ok(())
    }
}
