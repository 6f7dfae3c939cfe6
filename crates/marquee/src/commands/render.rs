//! `marquee render` command implementation.

use std::path::PathBuf;

use clap::Args;
use marquee_config::DeploymentTarget;
use marquee_deploy::{BuildConfig, StaticSiteBuilder};
use marquee_site::Site;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Deployment target whose settings are baked into the output.
    #[arg(short, long, default_value = "development")]
    target: DeploymentTarget,

    /// Output directory (default: the www directory).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(None)?;

        let output_dir = self
            .output_dir
            .unwrap_or_else(|| config.paths_resolved.www_dir.clone());

        output.info(&format!("Target: {}", self.target));
        output.info(&format!("Output: {}", output_dir.display()));

        let site = Site::new(config);
        let written = StaticSiteBuilder::new(
            &site,
            BuildConfig {
                output_dir: output_dir.clone(),
                target: self.target,
            },
        )
        .build()?;

        output.success(&format!(
            "Rendered {} files to {}",
            written.len(),
            output_dir.display()
        ));
        Ok(())
    }
}
