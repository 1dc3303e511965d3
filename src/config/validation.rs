//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic and required fields)
//! - Built-in endpoint paths must be well formed and pairwise distinct
//! - Fixed outputs must be non-empty
//! - Seeded services must not collide with reserved paths or each other
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::path::check_syntax;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.address.trim().is_empty() {
        errors.push(ValidationError::new("address", "must not be empty"));
    } else if config.address != "localhost" && config.address.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(
            "address",
            format!("\"{}\" is not an IP address", config.address),
        ));
    }

    for (field, value) in [
        ("startup_message", &config.startup_message),
        ("expected_test_output", &config.expected_test_output),
        ("expected_registration_output", &config.expected_registration_output),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    let builtins = [
        ("test_endpoint", &config.test_endpoint),
        ("registration_endpoint", &config.registration_endpoint),
        ("endpoints_endpoint", &config.endpoints_endpoint),
    ];
    let mut seen: HashSet<&str> = HashSet::from(["/"]);
    for (field, path) in builtins {
        if let Err(defect) = check_syntax(path) {
            errors.push(ValidationError::new(field, format!("\"{}\" {}", path, defect)));
        } else if path.split('/').any(|segment| segment.starts_with(':')) {
            errors.push(ValidationError::new(
                field,
                format!("\"{}\" has a segment starting with ':'", path),
            ));
        } else if !seen.insert(path.as_str()) {
            errors.push(ValidationError::new(
                field,
                format!("\"{}\" is already used by another built-in endpoint", path),
            ));
        }
    }

    for path in &config.reserved_paths {
        if path.is_empty() {
            errors.push(ValidationError::new("reserved_paths", "contains an empty path"));
        }
    }

    if config
        .observability
        .metrics_address
        .parse::<SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "\"{}\" is not an ip:port socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    let reserved = config.reserved_set();
    let mut service_paths = HashSet::new();
    for (i, service) in config.services.iter().enumerate() {
        let field = format!("services[{}].path", i);
        if let Err(defect) = check_syntax(&service.path) {
            errors.push(ValidationError::new(field, format!("\"{}\" {}", service.path, defect)));
        } else if reserved.contains(&service.path) {
            errors.push(ValidationError::new(
                field,
                format!("\"{}\" is a reserved path", service.path),
            ));
        } else if !service_paths.insert(service.path.as_str()) {
            errors.push(ValidationError::new(
                field,
                format!("\"{}\" is listed more than once", service.path),
            ));
        }
        if service.handler_ref.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("services[{}].handler_ref", i),
                "must not be empty",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceConfig;

    #[test]
    fn test_local_config_is_valid() {
        assert!(validate_config(&ServerConfig::local()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::local();
        config.test_endpoint = "__test__".into();
        config.registration_endpoint = "/".into();
        config.expected_test_output = String::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["expected_test_output", "test_endpoint", "registration_endpoint"]
        );
    }

    #[test]
    fn test_rejects_seeded_service_on_reserved_path() {
        let mut config = ServerConfig::local();
        config.services.push(ServiceConfig {
            path: "/__test__".into(),
            handler_ref: "echo.toml".into(),
        });
        config.services.push(ServiceConfig {
            path: "/echo".into(),
            handler_ref: "echo.toml".into(),
        });
        config.services.push(ServiceConfig {
            path: "/echo".into(),
            handler_ref: "other.toml".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("reserved"));
        assert!(errors[1].message.contains("more than once"));
    }

    #[test]
    fn test_rejects_capture_style_builtin_segment() {
        let mut config = ServerConfig::local();
        config.endpoints_endpoint = "/list/:all".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endpoints_endpoint");
    }

    #[test]
    fn test_rejects_unparseable_metrics_address() {
        let mut config = ServerConfig::local();
        config.observability.metrics_address = "localhost:9090".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "observability.metrics_address");

        config.observability.metrics_address = "[::1]:9090".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_non_ip_address() {
        let mut config = ServerConfig::local();
        config.address = "example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "address");
    }
}
