//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (path, handler_ref)
//!     → path.rs (syntax checks)
//!     → registry.rs (reserved/duplicate checks, handler load)
//!     → publish new RouteTable snapshot
//!
//! Incoming Request (path)
//!     → registry.rs lookup (lock-free snapshot read)
//!     → Return: RegisteredRoute or no match
//! ```
//!
//! # Design Decisions
//! - Exact, case-sensitive path matching; no patterns
//! - Routes are only ever added, never replaced or removed
//! - Deterministic: same input always matches same route
//! - Registration order is preserved for introspection

pub mod error;
pub mod path;
pub mod registry;

pub use error::RegistrationError;
pub use path::PathDefect;
pub use registry::{RegisteredRoute, RouteRegistry};
