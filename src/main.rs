//! http-echo-server
//!
//! A minimal HTTP/1.1 server built on Tokio.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌──────────┐    ┌──────────┐    ┌──────────┐
//!     ──────────────────▶│   net    │───▶│   http   │───▶│ routing  │
//!                        │ listener │    │  reader  │    │  router  │
//!                        └──────────┘    │  parser  │    └────┬─────┘
//!                                        └──────────┘         │
//!                                                             ▼
//!     Client Response    ┌──────────┐                   ┌──────────┐
//!     ◀──────────────────│ response │◀──────────────────│  files   │
//!                        │serializer│                   │  store   │
//!                        └──────────┘                   └──────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use http_echo_server::http::HttpServer;
use http_echo_server::lifecycle::{resolve_config, signals, Overrides, Shutdown};
use http_echo_server::net::Listener;
use http_echo_server::observability::{logging, metrics};

/// Minimal HTTP/1.1 server with echo and file routes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory served by the /files/ routes
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Split into the config file path and the values that override it.
    fn into_parts(self) -> (Option<PathBuf>, Overrides) {
        let overrides = Overrides {
            directory: self.directory,
            port: self.port,
            log_level: self.log_level,
        };
        (self.config, overrides)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config_path, overrides) = Cli::parse().into_parts();
    let config = resolve_config(config_path.as_deref(), overrides)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("http-echo-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        serving_directory = ?config.files.serving_directory,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
