//! Handler loading.
//!
//! # Responsibilities
//! - Resolve a handler reference to a file (relative to an optional root)
//! - Check existence at call time; nothing is cached
//! - Parse the manifest and instantiate the handler
//!
//! # Design Decisions
//! - Missing sources and sources that vanish before they are read are both
//!   `SourceNotFound`
//! - Everything else (directories, unreadable files, bad manifests) is
//!   `LoadFailed` with the underlying reason

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::handler::manifest::{HandlerManifest, ManifestFormat};
use crate::handler::Handler;

/// Error resolving a handler reference.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("source file \"{handler_ref}\" does not exist")]
    SourceNotFound { handler_ref: String },

    #[error("source file \"{handler_ref}\" could not be loaded: {reason}")]
    LoadFailed { handler_ref: String, reason: String },
}

/// Turns a handler reference into a callable handler.
pub trait HandlerLoader: Send + Sync {
    fn load(&self, handler_ref: &str) -> Result<Arc<dyn Handler>, LoadError>;
}

/// Loads handler manifests from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileHandlerLoader {
    root: Option<PathBuf>,
}

impl FileHandlerLoader {
    /// Loader resolving relative references against the working directory.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Loader resolving relative references against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Filesystem location of `handler_ref`.
    pub fn resolve(&self, handler_ref: &str) -> PathBuf {
        let path = Path::new(handler_ref);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl HandlerLoader for FileHandlerLoader {
    fn load(&self, handler_ref: &str) -> Result<Arc<dyn Handler>, LoadError> {
        let not_found = || LoadError::SourceNotFound {
            handler_ref: handler_ref.to_string(),
        };
        let failed = |reason: String| LoadError::LoadFailed {
            handler_ref: handler_ref.to_string(),
            reason,
        };

        if handler_ref.trim().is_empty() {
            return Err(not_found());
        }

        let path = self.resolve(handler_ref);
        if !path.exists() {
            return Err(not_found());
        }
        if path.is_dir() {
            return Err(failed("is a directory".to_string()));
        }

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => failed(e.to_string()),
        })?;

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        };

        let handler = HandlerManifest::parse(&content, format)
            .and_then(HandlerManifest::build)
            .map_err(failed)?;

        tracing::debug!(handler_ref = %handler_ref, path = %path.display(), "Handler loaded");
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ServiceRequest;
    use axum::http::Method;

    #[tokio::test]
    async fn test_loads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("echo.toml"), "kind = \"echo\"").unwrap();

        let loader = FileHandlerLoader::with_root(dir.path());
        let handler = loader.load("echo.toml").unwrap();

        let req = ServiceRequest::new(Method::GET, "/echo").with_query("echo", "hi");
        assert_eq!(handler.call(req).await.unwrap().body_text(), "hi");
    }

    #[test]
    fn test_missing_source() {
        let loader = FileHandlerLoader::new();
        assert_eq!(
            loader.load("/nonexistent/file").err(),
            Some(LoadError::SourceNotFound {
                handler_ref: "/nonexistent/file".into()
            })
        );
        assert!(matches!(
            loader.load("  "),
            Err(LoadError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_broken_manifest_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileHandlerLoader::new()
            .load(path.to_str().unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::LoadFailed { .. }));
    }

    #[test]
    fn test_directory_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileHandlerLoader::new()
            .load(dir.path().to_str().unwrap())
            .err()
            .unwrap();
        assert_eq!(
            err,
            LoadError::LoadFailed {
                handler_ref: dir.path().to_str().unwrap().to_string(),
                reason: "is a directory".into()
            }
        );
    }

    #[test]
    fn test_shipped_manifests_load() {
        let loader = FileHandlerLoader::with_root(concat!(env!("CARGO_MANIFEST_DIR"), "/services"));
        for name in ["echo.toml", "hello.toml", "pong.json"] {
            assert!(loader.load(name).is_ok(), "{}", name);
        }
    }
}
