//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize, required fields enforced by serde)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → CLI overrides (address, port) applied by main
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Meta-endpoint fields are required, everything else has defaults
//! - Validation separates syntactic (serde) from semantic checks
//! - Any error here is fatal: the process exits before binding

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use validation::{validate_config, ValidationError};
pub use schema::LimitsConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::ServiceConfig;
pub use schema::TimeoutConfig;
