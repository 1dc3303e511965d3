//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML or JSON file.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(&content)
    } else {
        parse_toml(&content)
    }
}

/// Parse and validate a TOML document.
pub fn parse_toml(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate a JSON document.
pub fn parse_json(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = serde_json::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
address = "127.0.0.1"
port = 0
startup_message = "started"
test_endpoint = "/__test__"
expected_test_output = "ok"
registration_endpoint = "/__register__"
expected_registration_output = "registered"
"#;

    #[test]
    fn test_minimal_toml_gets_defaults() {
        let config = parse_toml(MINIMAL).unwrap();
        assert_eq!(config.endpoints_endpoint, "/__get_endpoints__");
        assert!(config.services.is_empty());
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let content = MINIMAL.replace("port = 0\n", "");
        let err = parse_toml(&content).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("port"), "got: {}", err);
    }

    #[test]
    fn test_services_accept_original_field_names() {
        let content = format!(
            "{}\n[[services]]\nname = \"/echo\"\npath_to_source = \"services/echo.toml\"\n",
            MINIMAL
        );
        let config = parse_toml(&content).unwrap();
        assert_eq!(config.services[0].path, "/echo");
        assert_eq!(config.services[0].handler_ref, "services/echo.toml");
    }

    #[test]
    fn test_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"address":"127.0.0.1","port":0,"startup_message":"s","test_endpoint":"/t",
               "expected_test_output":"ok","registration_endpoint":"/r",
               "expected_registration_output":"done","reserved_paths":["/admin"]}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.test_endpoint, "/t");
        assert_eq!(config.reserved_paths, vec!["/admin"]);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let content = MINIMAL.replace("\"/__test__\"", "\"__test__\"");
        let err = parse_toml(&content).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: test_endpoint"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/dynroute.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("dynroute.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.services[0].path, "/ping");
        assert_eq!(config.handler_root.as_deref(), Some("./services"));
    }
}
