//! Response representation.
//!
//! # Responsibilities
//! - Transport-independent `ServiceResponse` produced by handlers
//! - Conversion into an axum response at the server boundary
//!
//! # Design Decisions
//! - Bodies are fully buffered; handlers return complete payloads
//! - A content type is set only when the handler asks for one

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Response returned by a handler.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ServiceResponse {
    /// Response with `status`, `body` and no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, body.into()).with_content_type(HeaderValue::from_static(TEXT_PLAIN))
    }

    /// `text/html` response.
    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, body.into()).with_content_type(HeaderValue::from_static(TEXT_HTML))
    }

    /// `application/json` response.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status, body)
            .with_content_type(HeaderValue::from_static("application/json")))
    }

    pub fn with_content_type(mut self, value: HeaderValue) -> Self {
        self.headers.insert(header::CONTENT_TYPE, value);
        self
    }

    /// Body as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_keeps_status_and_headers() {
        let response = ServiceResponse::text(StatusCode::CREATED, "made").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
    }

    #[test]
    fn test_json_body() {
        let response = ServiceResponse::json(StatusCode::OK, &vec!["/a", "/b"]).unwrap();
        assert_eq!(response.body_text(), r#"["/a","/b"]"#);
        assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
    }
}
