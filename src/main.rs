//! Universal endpoint demo server.
//!
//! Serves the demo service over HTTP.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener ─▶ request ID + trace ─▶ dispatcher ─▶ registry match
//!                                                           │
//!                                                           ▼
//!                                         extract argument ─▶ input guard ─▶ implementation
//!     Client Response                                                              │
//!     ◀────────────────────────────────── 200 JSON / 4xx / 5xx ◀───────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use universal_endpoint::config::{load_config, EndpointConfig};
use universal_endpoint::demo::DemoService;
use universal_endpoint::http::server::shutdown_signal;
use universal_endpoint::observability::{logging, metrics};
use universal_endpoint::{Dispatcher, EndpointServer};

#[derive(Parser)]
#[command(name = "universal-endpoint")]
#[command(about = "Serve the demo service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EndpointConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_filter);

    tracing::info!("universal-endpoint v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let demo = DemoService::define()?;
    let dispatcher = Dispatcher::new(&demo.service)
        .with_implementation(demo.implementation())
        .with_body_limit(config.limits.max_body_bytes);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    EndpointServer::new(dispatcher)
        .run(listener, shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
