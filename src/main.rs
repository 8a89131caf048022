//! Development forwarding proxy.
//!
//! Lets a browser frontend talk to a backend on another origin during
//! development: `/api/*` is forwarded to the upstream, every response gets
//! permissive CORS headers, and other GET requests are served from disk.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │               FORWARDING PROXY                │
//!                        │                                               │
//!   Client Request       │  ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//!   ─────────────────────┼─▶│   net    │──▶│   http   │──▶│ routing  │   │
//!                        │  │ listener │   │  server  │   │ classify │   │
//!                        │  └──────────┘   └──────────┘   └────┬─────┘   │
//!                        │                                     │         │
//!                        │         ┌──────────────┬────────────┤         │
//!                        │         ▼              ▼            ▼         │
//!                        │   ┌──────────┐   ┌──────────┐  preflight /    │
//!                        │   │  static  │   │ forward  │──────────────────┼──▶ Upstream
//!                        │   │  files   │   │  relay   │◀─────────────────┼─── Upstream
//!                        │   └────┬─────┘   └────┬─────┘  405 / 501      │
//!                        │        └──────┬───────┘                       │
//!   Client Response      │               ▼                               │
//!   ◀────────────────────┼──────── CORS headers                          │
//!                        │                                               │
//!                        │  config · lifecycle · observability · limits  │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_forward_proxy::config::{self, loader, ProxyConfig};
use api_forward_proxy::lifecycle::signals::spawn_signal_handler;
use api_forward_proxy::observability::{logging, metrics};
use api_forward_proxy::{HttpServer, Listener, Shutdown};

#[derive(Parser)]
#[command(name = "api-forward-proxy")]
#[command(about = "Serve a frontend and forward /api/* to a backend, with CORS headers", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL (overrides BACKEND_URL and the config file)
    #[arg(short, long)]
    upstream: Option<String>,

    /// Directory static files are served from
    #[arg(short, long)]
    root: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-forward-proxy starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.forwarding.upstream,
        path_prefix = %config.forwarding.path_prefix,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated as a socket address by validate_config.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        "Serving at http://{}, proxying {}* to {}. Press Ctrl+C to stop",
        local_addr,
        config.forwarding.path_prefix,
        config.forwarding.upstream
    );

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Defaults, then the config file, then the environment, then flags.
fn build_config(cli: &Cli) -> Result<ProxyConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => loader::read_config(path)?,
        None => ProxyConfig::default(),
    };

    loader::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    if let Some(port) = cli.port {
        loader::set_port(&mut config.listener, port);
    }
    if let Some(upstream) = &cli.upstream {
        config.forwarding.upstream = upstream.clone();
    }
    if let Some(root) = &cli.root {
        config.static_files.root = root.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    Ok(config)
}
