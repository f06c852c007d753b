//! market-proxy
//!
//! Forwards browser requests to a market-data REST API, fixing up paths,
//! symbol lists and headers, and answering CORS on the upstream's behalf.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     market-proxy                     │
//!   Client        │  ┌──────────┐   ┌─────────┐   ┌──────────────────┐   │
//!  ───────────────┼─▶│   CORS   │──▶│ request │──▶│ routing: path +  │   │
//!                 │  │preflight │   │   ID    │   │ symbols/query    │   │
//!                 │  └──────────┘   └─────────┘   └────────┬─────────┘   │
//!                 │                                        ▼             │
//!                 │                               ┌──────────────────┐   │
//!                 │                               │ security: header │   │
//!                 │                               │    filtering     │   │
//!                 │                               └────────┬─────────┘   │
//!                 │                                        ▼             │
//!   Client        │  ┌──────────┐   ┌─────────┐   ┌──────────────────┐   │   Upstream
//!  ◀──────────────┼──│ response │◀──│  gunzip │◀──│ upstream client  │◀──┼──  REST API
//!                 │  │ headers  │   │         │   │ (30s, no retry)  │   │
//!                 │  └──────────┘   └─────────┘   └──────────────────┘   │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use market_proxy::config::load_config;
use market_proxy::lifecycle::{spawn_signal_listener, Shutdown};
use market_proxy::observability::{init_logging, metrics};
use market_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "market-proxy", version)]
#[command(about = "Reverse proxy for a market-data REST API", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config.observability);

    tracing::info!("market-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation already checked the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
