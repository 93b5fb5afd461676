//! Request admission gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!        │
//!        ▼
//!   ┌─────────────────────────────── recovery (panic → 500) ──────┐
//!   │  ┌────────────┐    ┌──────────┐    ┌──────┐    ┌─────────┐   │
//!   │  │ rate limit │───▶│ identity │───▶│ role │───▶│ handler │   │
//!   │  └─────┬──────┘    └────┬─────┘    └──┬───┘    └────┬────┘   │
//!   │        │ 429            │ 401         │ 403         │ store  │
//!   └────────┴────────────────┴─────────────┴─────────────┴────────┘
//!        │
//!        ▼
//!   Client Response
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use admission_gateway::lifecycle::{signals, startup, Shutdown};
use admission_gateway::observability::{logging, metrics};
use admission_gateway::store::MemoryStore;
use admission_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "admission-gateway", version, about = "Bearer-token admission gateway")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keys usually come from .env in development.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = startup::load_configuration(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("admission-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "No .env file loaded, using process environment");
    }
    startup::log_configuration(&config);

    let keys = startup::load_keys(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, &keys, Arc::new(MemoryStore::new()));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
