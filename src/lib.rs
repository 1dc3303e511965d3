//! dynroute: an HTTP server whose endpoints are registered at runtime.
//!
//! A [`RouteRegistry`] owns the path → handler mapping. The registration
//! endpoint adds to it, the dispatcher reads from it, and both share it
//! through [`HttpServer`].

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use handler::{Handler, HandlerLoader};
pub use http::{HttpServer, ServiceRequest, ServiceResponse};
pub use lifecycle::{Shutdown, Startup};
pub use routing::{RegistrationError, RouteRegistry};
