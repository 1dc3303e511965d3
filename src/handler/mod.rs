//! Handler subsystem.
//!
//! # Data Flow
//! ```text
//! HandlerRef (path to a manifest file)
//!     → loader.rs (existence check, read, parse by extension)
//!     → manifest.rs (kind-tagged description)
//!     → echo.rs / fixed.rs / template.rs (instantiate)
//!     → Arc<dyn Handler>, bound into the route table by the registry
//!
//! Per request:
//!     ServiceRequest → Handler::call → ServiceResponse | HandlerError
//! ```
//!
//! # Design Decisions
//! - Handlers are opaque to the registry and dispatcher
//! - Loading is synchronous and fallible; nothing is cached between loads
//! - Invocation is async so slow handlers only hold their own task

pub mod echo;
pub mod fixed;
pub mod loader;
pub mod manifest;
pub mod template;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use crate::http::{ServiceRequest, ServiceResponse};

pub use loader::{FileHandlerLoader, HandlerLoader, LoadError};
pub use manifest::HandlerManifest;

/// Future returned by [`Handler::call`].
pub type HandlerFuture = BoxFuture<'static, Result<ServiceResponse, HandlerError>>;

/// Failure raised by a handler while serving a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A request handler bound to a route.
pub trait Handler: Send + Sync + 'static {
    /// Produce a response for `request`.
    fn call(&self, request: ServiceRequest) -> HandlerFuture;
}

/// Adapter turning an async closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceResponse, HandlerError>> + Send + 'static,
{
    fn call(&self, request: ServiceRequest) -> HandlerFuture {
        (self.f)(request).boxed()
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceResponse, HandlerError>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
