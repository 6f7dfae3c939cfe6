//! `marquee serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use marquee_config::CliSettings;
use marquee_server::{run_server, server_config_from_config};
use marquee_site::Site;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Dataset directory (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            data_dir: self.data_dir,
        };
        let config = self.config.load(Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Data directory: {}",
            config.paths_resolved.data_dir.display()
        ));
        output.info(&format!(
            "Static files: {}",
            config.paths_resolved.www_dir.display()
        ));

        let server_config = server_config_from_config(&config);
        run_server(server_config, Site::new(config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
