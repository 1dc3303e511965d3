//! Request normalization.
//!
//! # Responsibilities
//! - Carry the request ID assigned by the request-id layer
//! - Buffer the body up to the configured limit
//! - Decode query pairs and body fields (form-urlencoded or flat JSON)
//! - Hand handlers a transport-independent `ServiceRequest`
//!
//! # Design Decisions
//! - Handlers never see axum types; the server converts at the boundary
//! - Body decoding is lenient: unknown content types keep only raw bytes
//! - Parameter lookups return the first occurrence of a name

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Error converting an inbound HTTP request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Transport-independent request passed from the dispatcher to handlers.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Decoded body fields.
    pub fields: Vec<(String, String)>,
}

impl ServiceRequest {
    /// An empty request for `method path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    /// Value of body field `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        lookup(&self.fields, name)
    }

    /// Query parameter `name`, falling back to the body field of that name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query_param(name).or_else(|| self.field(name))
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Normalize an axum request, buffering at most `max_body_bytes`.
    pub async fn from_http(request: Request<Body>, max_body_bytes: usize) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();

        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let query = match parts.uri.query() {
            Some(q) => serde_urlencoded::from_str::<Vec<(String, String)>>(q)
                .map_err(|e| RequestError::MalformedBody(format!("query string: {}", e)))?,
            None => Vec::new(),
        };

        let body = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(|e| RequestError::Body(e.to_string()))?;

        let fields = decode_fields(&parts.headers, &body)?;

        Ok(Self {
            request_id,
            method: parts.method,
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body,
            fields,
        })
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Decode body fields according to the content type.
///
/// JSON bodies must be objects; nested values are kept in their JSON text form.
fn decode_fields(headers: &HeaderMap, body: &Bytes) -> Result<Vec<(String, String)>, RequestError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

    match content_type.as_deref() {
        Some("application/json") => {
            let value: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| RequestError::MalformedBody(e.to_string()))?;
            match value {
                serde_json::Value::Object(map) => Ok(map
                    .into_iter()
                    .map(|(k, v)| match v {
                        serde_json::Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect()),
                _ => Err(RequestError::MalformedBody(
                    "expected a JSON object".to_string(),
                )),
            }
        }
        Some("application/x-www-form-urlencoded") | None => {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                .map_err(|e| RequestError::MalformedBody(e.to_string()))
        }
        Some(_) => Ok(Vec::new()),
    }
}
