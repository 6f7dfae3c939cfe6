//! `marquee deploy` and `marquee destroy` command implementations.

use std::path::Path;

use clap::Args;
use marquee_config::{Config, DeploymentTarget};
use marquee_deploy::confirm::{self, confirmation_prompt, is_accepted, needs_confirmation};
use marquee_deploy::{BuildConfig, PublishConfig, S3Publisher, StaticSiteBuilder, gzip_tree};
use marquee_site::Site;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Branch assumed when none is given and git cannot tell.
const DEFAULT_BRANCH: &str = "master";

/// Arguments for the deploy command.
#[derive(Args)]
pub(crate) struct DeployArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Deployment target (production or staging).
    #[arg(short, long)]
    target: DeploymentTarget,

    /// Branch being deployed (default: the checked-out git branch).
    #[arg(short, long)]
    branch: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

impl DeployArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(None)?;
        let publish_config = PublishConfig::for_target(&config, self.target)?;

        let branch = self
            .branch
            .or_else(|| confirm::current_branch(&project_dir(&config)))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_owned());
        tracing::debug!(branch = %branch, deployment_target = %self.target, "Resolved branch");

        if needs_confirmation(self.target, &branch) && !self.yes {
            let answer = output.ask(&confirmation_prompt(&branch))?;
            if !is_accepted(&answer) {
                return Err(CliError::Aborted(format!(
                    "refusing to deploy '{branch}' to {}",
                    self.target
                )));
            }
        }

        let www_dir = config.paths_resolved.www_dir.clone();
        let gzip_dir = config.paths_resolved.gzip_dir.clone();

        output.highlight(&format!("Deploying {branch} to {}", self.target));
        let site = Site::new(config);
        let written = StaticSiteBuilder::new(
            &site,
            BuildConfig {
                output_dir: www_dir.clone(),
                target: self.target,
            },
        )
        .build()?;
        output.info(&format!("Rendered {} files", written.len()));

        let report = gzip_tree(&www_dir, &gzip_dir, &publish_config.gzip_types)?;
        output.info(&format!(
            "Gzipped {} files, copied {}",
            report.compressed, report.copied
        ));

        let buckets = publish_config.buckets.join(", ");
        let publisher = S3Publisher::new(publish_config);
        let rt = tokio::runtime::Runtime::new()?;
        let uploaded = rt.block_on(publisher.publish(&gzip_dir))?;

        output.success(&format!("Published {uploaded} objects to {buckets}"));
        Ok(())
    }
}

/// Arguments for the destroy command.
#[derive(Args)]
pub(crate) struct DestroyArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Deployment target (production or staging).
    #[arg(short, long)]
    target: DeploymentTarget,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

impl DestroyArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(None)?;
        let publish_config = PublishConfig::for_target(&config, self.target)?;

        let scope = format!(
            "{}/ in {}",
            publish_config.prefix,
            publish_config.buckets.join(", ")
        );

        if !self.yes {
            let answer = output.ask(&format!("Delete every object under {scope}?"))?;
            if !is_accepted(&answer) {
                return Err(CliError::Aborted(format!("nothing deleted from {scope}")));
            }
        }

        let publisher = S3Publisher::new(publish_config);
        let rt = tokio::runtime::Runtime::new()?;
        let deleted = rt.block_on(publisher.destroy())?;

        output.success(&format!("Deleted {deleted} objects under {scope}"));
        Ok(())
    }
}

/// Directory holding the config file, or the current directory.
fn project_dir(config: &Config) -> std::path::PathBuf {
    config
        .config_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}
