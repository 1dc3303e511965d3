//! Echo handler: responds with the value of one request parameter.

use axum::http::StatusCode;
use futures_util::future;
use futures_util::FutureExt;

use crate::handler::{Handler, HandlerError, HandlerFuture};
use crate::http::{ServiceRequest, ServiceResponse};

/// Parameter echoed when the manifest does not name one.
pub const DEFAULT_PARAM: &str = "echo";

#[derive(Debug, Clone)]
pub struct EchoHandler {
    param: String,
}

impl EchoHandler {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl Handler for EchoHandler {
    fn call(&self, request: ServiceRequest) -> HandlerFuture {
        let result = match request.param(&self.param).filter(|v| !v.is_empty()) {
            Some(value) => Ok(ServiceResponse::text(StatusCode::OK, value)),
            None => Err(HandlerError::new(format!("Missing `{}` param", self.param))),
        };
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[tokio::test]
    async fn test_echoes_query_then_body() {
        let handler = EchoHandler::new(DEFAULT_PARAM);

        let req = ServiceRequest::new(Method::GET, "/echo").with_query("echo", "hi");
        assert_eq!(handler.call(req).await.unwrap().body_text(), "hi");

        let req = ServiceRequest::new(Method::POST, "/echo").with_field("echo", "posted");
        assert_eq!(handler.call(req).await.unwrap().body_text(), "posted");
    }

    #[tokio::test]
    async fn test_missing_param_is_an_error() {
        let handler = EchoHandler::new("word");
        let req = ServiceRequest::new(Method::GET, "/echo").with_query("word", "");

        let err = handler.call(req).await.unwrap_err();
        assert_eq!(err.message(), "Missing `word` param");
    }
}
