//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the built-in endpoints
//! - Mount the registration endpoint
//! - Send every other path to the dispatcher via the fallback
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_registration_router;
use crate::config::ServerConfig;
use crate::dispatch::{builtin, Dispatcher};
use crate::http::ServiceRequest;
use crate::routing::RouteRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<RouteRegistry>,
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server hosting the built-in endpoints and the dynamic routes.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    registry: Arc<RouteRegistry>,
}

impl HttpServer {
    /// Create a server with an empty registry built from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(RouteRegistry::from_config(&config));
        Self::with_registry(config, registry)
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: ServerConfig, registry: Arc<RouteRegistry>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            registry: registry.clone(),
            dispatcher: Arc::new(Dispatcher::new(registry.clone())),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(builtin::root))
            .route(&config.test_endpoint, get(builtin::probe))
            .route(&config.endpoints_endpoint, get(builtin::endpoints))
            .merge(setup_registration_router(state.clone()))
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(SetResponseHeaderLayer::if_not_present(
                        header::SERVER,
                        HeaderValue::from_static("dynroute"),
                    ))
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.registry.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving in-process without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Fallback handler: everything that is not a built-in endpoint.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match ServiceRequest::from_http(request, state.config.limits.max_body_bytes).await {
        Ok(request) => state.dispatcher.dispatch(request).await.into_response(),
        Err(e) => e.into_response(),
    }
}
