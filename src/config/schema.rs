//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.
//! The top-level fields without defaults are required: serde reports the
//! missing field by name and startup aborts.

use serde::{Deserialize, Serialize};

/// Root configuration for the route host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "127.0.0.1").
    pub address: String,

    /// Port to bind. `0` picks an ephemeral port.
    pub port: u16,

    /// Line printed to stdout once the listener is bound.
    pub startup_message: String,

    /// Path of the fixed health probe.
    pub test_endpoint: String,

    /// Body returned by the health probe.
    pub expected_test_output: String,

    /// Path accepting `POST` registration requests.
    pub registration_endpoint: String,

    /// Body returned after a successful registration.
    pub expected_registration_output: String,

    /// Path of the JSON endpoint listing.
    #[serde(default = "default_endpoints_endpoint")]
    pub endpoints_endpoint: String,

    /// Additional paths that can never be registered.
    #[serde(default)]
    pub reserved_paths: Vec<String>,

    /// Bearer token required by the registration endpoint, if any.
    #[serde(default)]
    pub registration_token: Option<String>,

    /// Directory that relative handler references resolve against.
    #[serde(default)]
    pub handler_root: Option<String>,

    /// Services registered before the listener accepts traffic.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,

    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_endpoints_endpoint() -> String {
    "/__get_endpoints__".to_string()
}

impl ServerConfig {
    /// Configuration with the conventional meta-endpoint paths and outputs,
    /// bound to an ephemeral loopback port.
    pub fn local() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 0,
            startup_message: "__NODE_SERVER_IS_RUNNING__".to_string(),
            test_endpoint: "/__test__".to_string(),
            expected_test_output: "__SERVER_TEST__".to_string(),
            registration_endpoint: "/__register__".to_string(),
            expected_registration_output: "__ADDED_ENDPOINT__".to_string(),
            endpoints_endpoint: default_endpoints_endpoint(),
            reserved_paths: Vec::new(),
            registration_token: None,
            handler_root: None,
            services: Vec::new(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// `address:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    /// Paths served by built-in endpoints. Always reserved.
    pub fn builtin_paths(&self) -> Vec<String> {
        vec![
            "/".to_string(),
            self.test_endpoint.clone(),
            self.registration_endpoint.clone(),
            self.endpoints_endpoint.clone(),
        ]
    }

    /// Built-in paths unioned with the configured reserved paths.
    pub fn reserved_set(&self) -> Vec<String> {
        let mut reserved = self.builtin_paths();
        for path in &self.reserved_paths {
            if !reserved.contains(path) {
                reserved.push(path.clone());
            }
        }
        reserved
    }
}

/// A service registered at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Endpoint path (e.g., "/echo").
    #[serde(alias = "endpoint", alias = "name")]
    pub path: String,

    /// Location of the handler manifest.
    #[serde(alias = "path_to_source", alias = "handlerRef")]
    pub handler_ref: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests after a shutdown signal, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
