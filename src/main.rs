//! Static file server with status interception.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │               response-interceptor           │
//!                         │                                              │
//!     Client Request      │  ┌────────┐   ┌───────────┐   ┌──────────┐   │
//!     ────────────────────┼─▶│  http  │──▶│ AccessLog │──▶│ Redirect │   │
//!                         │  │ server │   │ (wrapper) │   │(wrapper) │   │
//!                         │  └────────┘   └───────────┘   └────┬─────┘   │
//!                         │                                    ▼         │
//!                         │                              ┌──────────┐    │
//!                         │                              │FileServer│    │
//!                         │                              └──────────┘    │
//!     Client Response     │  ┌──────────────┐                            │
//!     ◀───────────────────┼──│ResponseBuffer│◀── status / headers / body │
//!                         │  └──────────────┘                            │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! A file that does not exist yields `404`, which the redirect layer turns
//! into `307` with a `Location` on the configured host. The access log
//! reports the status and size actually sent.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use response_interceptor::config::{load_config, ServerConfig};
use response_interceptor::observability::{logging, metrics};
use response_interceptor::HttpServer;

#[derive(Parser)]
#[command(name = "response-interceptor")]
#[command(about = "Static file server with status-based redirects", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve, overriding the configuration.
    #[arg(short, long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(root) = cli.root {
        config.files.root = root;
    }

    logging::init_tracing(&config.observability.log_level);

    tracing::info!("response-interceptor v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root = %config.files.root.display(),
        redirect = config.redirect.enabled,
        access_log = config.access_log.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

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
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::from_config(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
