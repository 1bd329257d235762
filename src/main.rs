//! Trailhead proxy server
//!
//! Run with: cargo run --bin trailhead
//!
//! # Configuration
//!
//! Reads `config.toml` from the usual locations (see `trailhead::config`),
//! then environment variables:
//! - `ORS_API_KEY`: OpenRouteService API key
//! - `TRAILHEAD_HOST` / `TRAILHEAD_PORT`: bind address (default: 127.0.0.1:5000)
//! - `RUST_LOG`: Log filter (overrides the configured level)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use trailhead::api::{serve, AppState};
use trailhead::config::Config;
use trailhead::routing::{RoutingClient, RoutingService};

#[derive(Parser)]
#[command(name = "trailhead")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Walking-directions proxy for the OpenRouteService API")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    trailhead::logging::init(&config.logging);

    tracing::info!("Starting Trailhead proxy v{}", env!("CARGO_PKG_VERSION"));

    let routing = RoutingClient::new(config.routing.clone()).context("building routing client")?;
    tracing::info!("Routing endpoint: {}", routing.directions_url());
    if !routing.is_configured() {
        tracing::warn!("No routing API key configured (set ORS_API_KEY); upstream will refuse requests");
    }

    let state = AppState::new(Arc::new(routing));
    serve(state, &config.server).await?;

    tracing::info!("Trailhead proxy stopped");
    Ok(())
}
