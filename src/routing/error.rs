//! Registration errors.

use thiserror::Error;

use crate::handler::LoadError;
use crate::routing::path::PathDefect;

/// Why a registration was rejected. Every variant leaves the registry untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{}", malformed_message(.path, .defect))]
    MalformedPath { path: String, defect: PathDefect },

    #[error("Endpoint \"{path}\" cannot be registered")]
    ReservedPath { path: String },

    #[error("Endpoint \"{path}\" has already been registered as {existing}")]
    DuplicatePath { path: String, existing: String },

    #[error(
        "Trying to register endpoint \"{path}\" with source file \"{handler_ref}\", but the specified file does not exist"
    )]
    HandlerNotFound { path: String, handler_ref: String },

    #[error("Failed to load source file \"{handler_ref}\" for endpoint \"{path}\": {reason}")]
    LoadFailed {
        path: String,
        handler_ref: String,
        reason: String,
    },
}

fn malformed_message(path: &str, defect: &PathDefect) -> String {
    match defect {
        PathDefect::Empty => format!("Malformed endpoint provided. Received \"{}\"", path),
        PathDefect::MissingLeadingSlash => format!(
            "Endpoints must start with a forward-slash, trying to register \"{}\"",
            path
        ),
        PathDefect::IllegalChar(_) => format!("Endpoint \"{}\" {}", path, defect),
    }
}

impl RegistrationError {
    pub(crate) fn from_load(path: &str, err: LoadError) -> Self {
        match err {
            LoadError::SourceNotFound { handler_ref } => RegistrationError::HandlerNotFound {
                path: path.to_string(),
                handler_ref,
            },
            LoadError::LoadFailed {
                handler_ref,
                reason,
            } => RegistrationError::LoadFailed {
                path: path.to_string(),
                handler_ref,
                reason,
            },
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::MalformedPath { .. } => "malformed_path",
            RegistrationError::ReservedPath { .. } => "reserved_path",
            RegistrationError::DuplicatePath { .. } => "duplicate_path",
            RegistrationError::HandlerNotFound { .. } => "handler_not_found",
            RegistrationError::LoadFailed { .. } => "load_failed",
        }
    }

    /// The rejected endpoint path.
    pub fn path(&self) -> &str {
        match self {
            RegistrationError::MalformedPath { path, .. }
            | RegistrationError::ReservedPath { path }
            | RegistrationError::DuplicatePath { path, .. }
            | RegistrationError::HandlerNotFound { path, .. }
            | RegistrationError::LoadFailed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_offending_values() {
        let err = RegistrationError::MalformedPath {
            path: String::new(),
            defect: PathDefect::Empty,
        };
        assert_eq!(err.to_string(), "Malformed endpoint provided. Received \"\"");

        let err = RegistrationError::MalformedPath {
            path: "/a b".into(),
            defect: PathDefect::IllegalChar(' '),
        };
        assert!(err.to_string().starts_with("Endpoint \"/a b\" contains whitespace"));

        let err = RegistrationError::DuplicatePath {
            path: "/echo".into(),
            existing: "services/echo.toml".into(),
        };
        assert_eq!(
            err.to_string(),
            "Endpoint \"/echo\" has already been registered as services/echo.toml"
        );
    }

    #[test]
    fn test_from_load_keeps_reference() {
        let err = RegistrationError::from_load(
            "/new",
            LoadError::SourceNotFound {
                handler_ref: "/nonexistent/file".into(),
            },
        );
        assert_eq!(err.kind(), "handler_not_found");
        assert_eq!(err.path(), "/new");
        assert!(err.to_string().contains("\"/nonexistent/file\""));
    }
}
