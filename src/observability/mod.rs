//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!     → tower-http TraceLayer (request spans carrying x-request-id)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings, for machine parsing
//! - Request ID flows from the request-id layer into handler requests
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
