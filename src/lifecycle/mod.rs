//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Seed services → Bind listener → Announce address
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Services are registered before the listener binds, so the first
//!   accepted request already sees them
//! - Any seeding failure is fatal and nothing is bound
//! - Shutdown has a grace period: forced exit after the deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{AddressInfo, Startup, StartupError};
