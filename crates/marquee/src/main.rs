//! marquee CLI - static news-app generator.
//!
//! Provides commands for:
//! - `serve`: Start the development server
//! - `render`: Render the site to static files
//! - `deploy` / `destroy`: Publish to or remove from S3
//! - `data`: Print a dataset as JSON
//! - `build-awards` / `deploy-awards`: Classify and publish the awards feed

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    BuildAwardsArgs, DataArgs, DeployArgs, DeployAwardsArgs, DestroyArgs, RenderArgs, ServeArgs,
};
use output::Output;

/// marquee - static news-app generator.
#[derive(Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    /// Log progress at info level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development server.
    Serve(ServeArgs),
    /// Render the site to static files.
    Render(RenderArgs),
    /// Render, gzip and publish the site to a deployment target.
    Deploy(DeployArgs),
    /// Delete the deployed site from a deployment target.
    Destroy(DestroyArgs),
    /// Print a dataset as JSON.
    Data(DataArgs),
    /// Classify the awards feed into awards.json.
    BuildAwards(BuildAwardsArgs),
    /// Build awards.json and upload it to a deployment target.
    DeployAwards(DeployAwardsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute()),
            Err(e) => Err(e.into()),
        },
        Commands::Render(args) => args.execute(),
        Commands::Deploy(args) => args.execute(),
        Commands::Destroy(args) => args.execute(),
        Commands::Data(args) => args.execute(),
        Commands::BuildAwards(args) => args.execute(),
        Commands::DeployAwards(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
