//! dynroute server.
//!
//! Starts an HTTP server whose routes are added at runtime through the
//! registration endpoint.
//!
//! ```text
//!     Client Request
//!     ──────▶ http server ──▶ built-in endpoint? ──yes──▶ probe / listing / register
//!                                   │ no                                  │
//!                                   ▼                                     ▼
//!                              dispatcher ──lookup──▶ route registry ◀── loader
//!                                   │                                (handler manifests)
//!                                   ▼
//!                              handler ──▶ response
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dynroute::config::{load_config, validate_config, ConfigError, ServerConfig};
use dynroute::lifecycle::{signals, Shutdown, Startup, StartupError};
use dynroute::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "dynroute")]
#[command(about = "HTTP server with endpoints registered at runtime", long_about = None)]
struct Args {
    /// Configuration file (TOML, or JSON by extension). Defaults to the
    /// conventional meta-endpoints on an ephemeral loopback port.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    address: Option<String>,

    /// Override the port (0 picks a free one).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dynroute starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(args: &Args) -> Result<ServerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::local(),
    };
    if let Some(address) = &args.address {
        config.address = address.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    tracing::info!(
        address = %config.address,
        port = config.port,
        services = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let startup = Startup::prepare(config).await?;
    println!("{}", startup.banner());

    let shutdown = Shutdown::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let signal = signals::wait_for_signal().await;
            tracing::info!(signal, "Termination signal received");
            shutdown.trigger();
        }
    });

    startup.serve(&shutdown).await
}
