//! Fixed-response handler (`kind = "static"`).

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use futures_util::future;
use futures_util::FutureExt;

use crate::handler::{Handler, HandlerFuture};
use crate::http::{ServiceRequest, ServiceResponse};

#[derive(Debug, Clone)]
pub struct FixedHandler {
    status: StatusCode,
    body: Bytes,
    content_type: Option<HeaderValue>,
}

impl FixedHandler {
    /// Build from raw manifest values, rejecting invalid status codes and
    /// content types.
    pub fn new(status: u16, body: String, content_type: Option<String>) -> Result<Self, String> {
        let status = StatusCode::from_u16(status)
            .map_err(|_| format!("invalid status code {}", status))?;
        let content_type = content_type
            .map(|ct| {
                HeaderValue::from_str(&ct).map_err(|_| format!("invalid content type \"{}\"", ct))
            })
            .transpose()?;

        Ok(Self {
            status,
            body: Bytes::from(body),
            content_type,
        })
    }
}

impl Handler for FixedHandler {
    fn call(&self, _request: ServiceRequest) -> HandlerFuture {
        let mut response = ServiceResponse::new(self.status, self.body.clone());
        if let Some(ct) = &self.content_type {
            response = response.with_content_type(ct.clone());
        }
        future::ready(Ok(response)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};

    #[tokio::test]
    async fn test_returns_configured_response() {
        let handler =
            FixedHandler::new(202, "queued".into(), Some("text/plain".into())).unwrap();
        let response = handler
            .call(ServiceRequest::new(Method::PUT, "/jobs"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert_eq!(response.body_text(), "queued");
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_rejects_bad_status() {
        let err = FixedHandler::new(1000, String::new(), None).unwrap_err();
        assert_eq!(err, "invalid status code 1000");
    }
}
