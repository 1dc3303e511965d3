//! Template handler: renders a minijinja template against the request.
//!
//! The template is compiled once at load time so syntax errors surface as
//! load failures. Undefined variables are errors at render time, which the
//! dispatcher reports as a failed request.
//!
//! Context variables: `method`, `path`, `query`, `form`, `headers`.

use std::collections::BTreeMap;

use axum::http::{HeaderValue, StatusCode};
use futures_util::future;
use futures_util::FutureExt;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::handler::{Handler, HandlerError, HandlerFuture};
use crate::http::{ServiceRequest, ServiceResponse};

/// Name the single template is stored under in its environment.
const TEMPLATE_NAME: &str = "handler";

pub struct TemplateHandler {
    env: Environment<'static>,
    content_type: Option<HeaderValue>,
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    method: &'a str,
    path: &'a str,
    query: BTreeMap<&'a str, &'a str>,
    form: BTreeMap<&'a str, &'a str>,
    headers: BTreeMap<&'a str, &'a str>,
}

impl<'a> TemplateContext<'a> {
    fn from_request(request: &'a ServiceRequest) -> Self {
        // Later duplicates must not shadow the first value, matching ServiceRequest lookups.
        let first_wins = |pairs: &'a [(String, String)]| {
            let mut map = BTreeMap::new();
            for (k, v) in pairs {
                map.entry(k.as_str()).or_insert(v.as_str());
            }
            map
        };

        Self {
            method: request.method.as_str(),
            path: &request.path,
            query: first_wins(request.query.as_slice()),
            form: first_wins(request.fields.as_slice()),
            headers: request
                .headers
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
                .collect(),
        }
    }
}

impl TemplateHandler {
    /// Compile `source`, returning the syntax error text on failure.
    pub fn new(source: String, content_type: Option<String>) -> Result<Self, String> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template_owned(TEMPLATE_NAME, source)
            .map_err(|e| e.to_string())?;

        let content_type = content_type
            .map(|ct| {
                HeaderValue::from_str(&ct).map_err(|_| format!("invalid content type \"{}\"", ct))
            })
            .transpose()?;

        Ok(Self { env, content_type })
    }

    fn render(&self, request: &ServiceRequest) -> Result<ServiceResponse, HandlerError> {
        let body = self
            .env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(TemplateContext::from_request(request)))
            .map_err(|e| HandlerError::new(format!("Template render failed: {}", e)))?;

        let mut response = ServiceResponse::text(StatusCode::OK, body);
        if let Some(ct) = &self.content_type {
            response = response.with_content_type(ct.clone());
        }
        Ok(response)
    }
}

impl Handler for TemplateHandler {
    fn call(&self, request: ServiceRequest) -> HandlerFuture {
        future::ready(self.render(&request)).boxed()
    }
}
