//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the registry and register the configured services
//! - Bind the listener and describe the bound address
//! - Serve until shutdown, bounded by the grace period
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Services register in file order; the first failure aborts startup
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::routing::{RegistrationError, RouteRegistry};

/// Fatal startup or serving error.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to add service \"{path}\" from \"{handler_ref}\": {source}")]
    Service {
        path: String,
        handler_ref: String,
        #[source]
        source: RegistrationError,
    },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metrics address: {0}")]
    MetricsAddress(#[from] std::net::AddrParseError),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The bound address, announced on stdout after the startup message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInfo {
    pub address: String,
    pub family: &'static str,
    pub port: u16,
}

impl AddressInfo {
    pub fn from_socket(addr: SocketAddr) -> Self {
        Self {
            address: addr.ip().to_string(),
            family: if addr.is_ipv4() { "IPv4" } else { "IPv6" },
            port: addr.port(),
        }
    }

    /// Single-line JSON form.
    pub fn to_json_line(&self) -> String {
        serde_json::json!({
            "address": self.address,
            "family": self.family,
            "port": self.port,
        })
        .to_string()
    }
}

/// A server whose services are registered and whose listener is bound.
pub struct Startup {
    server: HttpServer,
    listener: TcpListener,
    address: AddressInfo,
}

impl Startup {
    /// Register `config.services` and bind `config.bind_address()`.
    pub async fn prepare(config: ServerConfig) -> Result<Self, StartupError> {
        let registry = Arc::new(RouteRegistry::from_config(&config));
        Self::prepare_with_registry(config, registry).await
    }

    /// Like [`Startup::prepare`], seeding into an existing registry.
    pub async fn prepare_with_registry(
        config: ServerConfig,
        registry: Arc<RouteRegistry>,
    ) -> Result<Self, StartupError> {
        for service in &config.services {
            registry
                .register(&service.path, &service.handler_ref)
                .map_err(|source| StartupError::Service {
                    path: service.path.clone(),
                    handler_ref: service.handler_ref.clone(),
                    source,
                })?;
        }
        tracing::info!(services = config.services.len(), "Services registered");

        let bind_address = config.bind_address();
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: bind_address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        tracing::info!(address = %local_addr, "Listening for connections");

        Ok(Self {
            server: HttpServer::with_registry(config, registry),
            listener,
            address: AddressInfo::from_socket(local_addr),
        })
    }

    pub fn address(&self) -> &AddressInfo {
        &self.address
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        self.server.registry()
    }

    /// Startup message followed by the address line.
    pub fn banner(&self) -> String {
        format!(
            "{}\n{}",
            self.server.config().startup_message,
            self.address.to_json_line()
        )
    }

    /// Serve until `shutdown` fires, then allow in-flight requests the
    /// configured grace period before giving up on them.
    pub async fn serve(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let grace = Duration::from_secs(self.server.config().timeouts.shutdown_grace_secs);
        let mut signal = shutdown.subscribe();
        let mut server = tokio::spawn(self.server.run(self.listener, shutdown.subscribe()));

        tokio::select! {
            result = &mut server => return flatten(result),
            _ = signal.recv() => {}
        }

        match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => flatten(result),
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Grace period elapsed with requests in flight"
                );
                server.abort();
                Ok(())
            }
        }
    }
}

fn flatten(
    result: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), StartupError> {
    match result {
        Ok(inner) => inner.map_err(StartupError::Serve),
        Err(e) => Err(StartupError::Serve(std::io::Error::other(e))),
    }
}
