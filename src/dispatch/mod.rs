//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → built-in route? (root listing, probe, endpoint listing, registration)
//!         → builtin.rs / admin
//!     → otherwise ServiceRequest
//!         → dispatcher.rs (lookup in live table, invoke handler)
//!         → ServiceResponse | 404 | 500
//! ```
//!
//! # Design Decisions
//! - Built-in endpoints are plain axum routes; dynamic routes live behind
//!   the fallback so the axum router never changes after startup
//! - Handler failures are isolated per request

pub mod builtin;
pub mod dispatcher;

pub use dispatcher::Dispatcher;
