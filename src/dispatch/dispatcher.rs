//! Per-request dispatch to registered handlers.
//!
//! # Responsibilities
//! - Look up the request path in the live route table
//! - Invoke the bound handler outside any registry lock
//! - Turn handler errors and panics into 500 responses
//! - Record request metrics

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::http::{ServiceRequest, ServiceResponse};
use crate::observability::metrics;
use crate::routing::RouteRegistry;

/// Routes requests to the handlers held by a [`RouteRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Serve `request` with the handler registered for its path.
    ///
    /// Unmatched paths get 404. A handler that fails or panics gets 500;
    /// the failure is logged and does not affect other requests.
    pub async fn dispatch(&self, request: ServiceRequest) -> ServiceResponse {
        let start = Instant::now();
        let method = request.method.to_string();
        let request_id = request.request_id.clone();

        let Some(route) = self.registry.lookup(&request.path) else {
            tracing::debug!(request_id = %request_id, path = %request.path, "No route matched");
            metrics::record_request(&method, metrics::NO_ROUTE, 404, start);
            return ServiceResponse::text(
                StatusCode::NOT_FOUND,
                format!("No route registered for \"{}\"", request.path),
            );
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %route.path(),
            handler_ref = %route.handler_ref(),
            "Dispatching request"
        );

        let handler = route.handler().clone();
        let outcome = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(
                    request_id = %request_id,
                    path = %route.path(),
                    handler_ref = %route.handler_ref(),
                    error = %e,
                    "Handler failed"
                );
                metrics::record_handler_failure(route.path());
                ServiceResponse::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error at {}: {}", route.path(), e),
                )
            }
            Err(panic) => {
                tracing::error!(
                    request_id = %request_id,
                    path = %route.path(),
                    handler_ref = %route.handler_ref(),
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                metrics::record_handler_failure(route.path());
                ServiceResponse::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error at {}: handler panicked", route.path()),
                )
            }
        };

        metrics::record_request(&method, route.path(), response.status.as_u16(), start);
        response
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
