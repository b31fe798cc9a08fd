//! TripIt MCP server.
//!
//! ```text
//!   MCP client ──POST /mcp──▶ ┌────────────┐    ┌────────────┐    ┌──────────────────┐
//!                             │ dispatcher │───▶│   tools    │───▶│ resilient client │──▶ TripIt API
//!   Browser ──/oauth/*──────▶ │ oauth flow │    └────────────┘    │ throttle + retry │
//!                             └─────┬──────┘                      │ OAuth 1.0 signer │
//!                                   ▼                             └──────────────────┘
//!                              token store
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tripit_mcp::http::HttpServer;
use tripit_mcp::lifecycle::{self, Shutdown};
use tripit_mcp::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tripit-mcp")]
#[command(about = "MCP server for the TripIt travel API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = lifecycle::load_configuration(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("tripit-mcp v{} starting", env!("CARGO_PKG_VERSION"));

    let prepared = lifecycle::prepare(config)?;
    let config = prepared.config;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config, prepared.secrets)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        joined = &mut server_task => {
            joined??;
            return Ok(());
        }
        _ = lifecycle::wait_for_signal() => {}
    }
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
