use reqwest::{Client, RequestBuilder, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A success response whose body was not what the endpoint returns.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            ClientError::Decode(_) => None,
        }
    }
}

/// Paths of the server's built-in endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEndpoints {
    pub test: String,
    pub register: String,
    pub endpoints: String,
}

impl Default for MetaEndpoints {
    fn default() -> Self {
        Self {
            test: "/__test__".to_string(),
            register: "/__register__".to_string(),
            endpoints: "/__get_endpoints__".to_string(),
        }
    }
}

pub struct RouteHostClient {
    client: Client,
    base_url: String,
    meta: MetaEndpoints,
    token: Option<String>,
}

impl RouteHostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            meta: MetaEndpoints::default(),
            token: None,
        }
    }

    pub fn with_meta_endpoints(mut self, meta: MetaEndpoints) -> Self {
        self.meta = meta;
        self
    }

    /// Bearer token sent with registration requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hit the probe endpoint, returning its body.
    pub async fn test(&self) -> Result<String, ClientError> {
        self.send(self.client.get(self.url(&self.meta.test))).await
    }

    /// Registered endpoints in registration order.
    pub async fn get_endpoints(&self) -> Result<Vec<String>, ClientError> {
        let text = self.send(self.client.get(self.url(&self.meta.endpoints))).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Register `endpoint` with the handler source at `path_to_source`.
    pub async fn add_service(&self, endpoint: &str, path_to_source: &str) -> Result<String, ClientError> {
        let mut request = self
            .client
            .post(self.url(&self.meta.register))
            .form(&[("endpoint", endpoint), ("path_to_source", path_to_source)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    /// Register `endpoint` unless it is already registered. Returns whether
    /// this call made the registration; losing a race to another client
    /// counts as already registered.
    pub async fn ensure_service(&self, endpoint: &str, path_to_source: &str) -> Result<bool, ClientError> {
        if self.get_endpoints().await?.iter().any(|e| e == endpoint) {
            return Ok(false);
        }
        match self.add_service(endpoint, path_to_source).await {
            Ok(_) => Ok(true),
            Err(ClientError::Status { status, .. }) if status == StatusCode::CONFLICT => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Call a registered endpoint with query parameters.
    pub async fn get_service(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, ClientError> {
        self.send(self.client.get(self.url(endpoint)).query(params)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status { status, message: text });
        }
        Ok(text)
    }
}
