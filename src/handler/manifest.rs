//! Handler manifests.
//!
//! A manifest is a small TOML or JSON document naming a handler `kind` and
//! its parameters:
//!
//! ```toml
//! kind = "echo"
//! param = "echo"
//! ```
//!
//! ```toml
//! kind = "static"
//! status = 200
//! body = "pong"
//! ```
//!
//! ```toml
//! kind = "template"
//! template = "hello {{ query.name }}"
//! content_type = "text/html"
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::handler::echo::{EchoHandler, DEFAULT_PARAM};
use crate::handler::fixed::FixedHandler;
use crate::handler::template::TemplateHandler;
use crate::handler::Handler;

/// Source format of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

/// Description of a handler, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerManifest {
    Echo {
        #[serde(default = "default_param")]
        param: String,
    },
    Static {
        #[serde(default = "default_status")]
        status: u16,
        #[serde(default)]
        body: String,
        #[serde(default)]
        content_type: Option<String>,
    },
    Template {
        template: String,
        #[serde(default)]
        content_type: Option<String>,
    },
}

fn default_param() -> String {
    DEFAULT_PARAM.to_string()
}

fn default_status() -> u16 {
    200
}

impl HandlerManifest {
    /// Parse manifest text in the given format.
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self, String> {
        match format {
            ManifestFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Instantiate the described handler.
    pub fn build(self) -> Result<Arc<dyn Handler>, String> {
        let handler: Arc<dyn Handler> = match self {
            HandlerManifest::Echo { param } => {
                if param.is_empty() {
                    return Err("echo param must not be empty".to_string());
                }
                Arc::new(EchoHandler::new(param))
            }
            HandlerManifest::Static {
                status,
                body,
                content_type,
            } => Arc::new(FixedHandler::new(status, body, content_type)?),
            HandlerManifest::Template {
                template,
                content_type,
            } => Arc::new(TemplateHandler::new(template, content_type)?),
        };
        Ok(handler)
    }
}
