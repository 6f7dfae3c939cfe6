//! `marquee build-awards` and `marquee deploy-awards` command implementations.

use std::path::{Path, PathBuf};

use clap::Args;
use marquee_config::DeploymentTarget;
use marquee_data::awards;
use marquee_deploy::{PublishConfig, S3Publisher};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Key the awards file is published under, relative to the deployed name.
const AWARDS_KEY: &str = "live-data/awards.json";

/// Arguments for the build-awards command.
#[derive(Args)]
pub(crate) struct BuildAwardsArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Spreadsheet list feed (JSON or JSONP).
    #[arg(short, long)]
    feed: PathBuf,

    /// Output file (default: www/live-data/awards.json).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl BuildAwardsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.config.load(None)?;
        let path = self
            .output
            .unwrap_or_else(|| config.paths_resolved.awards_json());
        build_awards(&self.feed, &path)?;
        Ok(())
    }
}

/// Arguments for the deploy-awards command.
#[derive(Args)]
pub(crate) struct DeployAwardsArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Spreadsheet list feed (JSON or JSONP).
    #[arg(short, long)]
    feed: PathBuf,

    /// Deployment target (production or staging).
    #[arg(short, long)]
    target: DeploymentTarget,
}

impl DeployAwardsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(None)?;
        let publish_config = PublishConfig::for_target(&config, self.target)?;

        let path = config.paths_resolved.awards_json();
        build_awards(&self.feed, &path)?;

        let publisher = S3Publisher::new(publish_config);
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(publisher.put_file(&path, AWARDS_KEY))?;

        output.success(&format!(
            "Published {AWARDS_KEY} to {}",
            publisher.config().buckets.join(", ")
        ));
        Ok(())
    }
}

/// Classify `feed` and write the awards JSON to `path`.
fn build_awards(feed: &Path, path: &Path) -> Result<(), CliError> {
    let output = Output::new();

    let text = std::fs::read_to_string(feed)?;
    let document = awards::parse_feed(&text)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document.to_json()?)?;

    output.success(&format!(
        "Wrote {} awards ({} decided) to {}",
        document.with_winners.len() + document.without_winners.len(),
        document.with_winners.len(),
        path.display()
    ));
    Ok(())
}
