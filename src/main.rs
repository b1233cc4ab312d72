//! Streaming SSE gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 STREAM GATEWAY               │
//!   Browser              │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   POST /api/*/stream ──┼─▶│  http  │──▶│ handlers │──▶│  upstream  │──┼──▶ API server
//!                        │  │ server │   │ (forward)│   │   client   │  │
//!                        │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                        │                                    │ chunks  │
//!   text/event-stream    │  ┌────────────────────────┐        │         │
//!   ◀────────────────────┼──│ relay task → mpsc(1)   │◀───────┘         │
//!                        │  └────────────────────────┘                  │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use stream_gateway::config::load_config;
use stream_gateway::lifecycle::{shutdown::DRAIN_GRACE_PERIOD, signals, Shutdown};
use stream_gateway::observability::{logging, metrics};
use stream_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "stream-gateway")]
#[command(about = "Streaming SSE gateway in front of the analytics API", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("stream-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
        }
    }

    match tokio::time::timeout(DRAIN_GRACE_PERIOD, server_task).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            grace_secs = DRAIN_GRACE_PERIOD.as_secs(),
            "Open streams did not finish in time, exiting"
        ),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
