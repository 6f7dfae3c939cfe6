//! Development server for marquee.
//!
//! Serves the site straight from its sources with axum:
//!
//! - every entry of the page registry at its path, rendered per request;
//! - `GET /live-data/<identifier>.json`, the dataset re-read from CSV;
//! - `GET /less/<file>`, compiled on demand;
//! - any other path from `www/`.
//!
//! Nothing is cached between requests, so edits to data, templates and
//! stylesheets show up on the next reload.
//!
//! # Quick Start
//!
//! ```ignore
//! use marquee_config::Config;
//! use marquee_server::{run_server, server_config_from_config};
//! use marquee_site::Site;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     let server_config = server_config_from_config(&config);
//!     run_server(server_config, Site::new(config)).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use marquee_config::DeploymentTarget;
use marquee_site::{RenderOptions, Site};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Target pages are rendered for.
    pub target: DeploymentTarget,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            target: DeploymentTarget::Development,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig, site: Site) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        site,
        options: RenderOptions::for_target(config.target),
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, deployment_target = %config.target, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from marquee config.
#[must_use]
pub fn server_config_from_config(config: &marquee_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        target: DeploymentTarget::Development,
    }
}
