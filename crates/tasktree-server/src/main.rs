//! TaskTree Planning Server
//!
//! Serves the task dependency store over two MCP surfaces (streamable HTTP
//! and legacy JSON endpoints) plus a small REST read API.

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod http;
mod mcp;
mod metrics;
mod state;

use state::AppState;

/// TaskTree planning server.
#[derive(Parser, Debug)]
#[command(name = "tasktree-server", about = "TaskTree planning server")]
struct Args {
    /// HTTP server address
    #[arg(long, default_value = "[::1]:50061")]
    http_addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tasktree=info".parse()?))
        .init();

    let http_addr: SocketAddr = args.http_addr.parse()?;

    // Create shared state
    let state = AppState::new();

    // The token stops the MCP transport's sessions on shutdown.
    let ct = CancellationToken::new();

    // Merge the REST/legacy router with the streamable-HTTP MCP router.
    let router = http::create_router(state.clone()).merge(mcp::create_mcp_router(state, ct.clone()));

    info!(http_addr = %http_addr, "Starting TaskTree server");

    let listener = TcpListener::bind(http_addr).await?;

    let shutdown_ct = ct.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown_ct.cancel();
        })
        .await?;

    info!("TaskTree server stopped");

    Ok(())
}
