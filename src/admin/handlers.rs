use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::http::ServiceRequest;
use crate::routing::RegistrationError;

/// Decoded body of a registration request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub endpoint: String,
    pub path_to_source: String,
}

impl RegistrationRequest {
    /// Read `endpoint` (or `path`) and `path_to_source` (or `handlerRef`,
    /// `handler_ref`) from the decoded body. Absent fields are empty and fail
    /// registration with a descriptive error.
    pub fn from_request(request: &ServiceRequest) -> Self {
        Self {
            endpoint: first_field(request, &["endpoint", "path"]),
            path_to_source: first_field(request, &["path_to_source", "handlerRef", "handler_ref"]),
        }
    }
}

fn first_field(request: &ServiceRequest, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| request.field(name))
        .unwrap_or_default()
        .to_string()
}

/// HTTP status reported for each rejection.
pub fn registration_status(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::MalformedPath { .. } => StatusCode::BAD_REQUEST,
        RegistrationError::ReservedPath { .. } => StatusCode::FORBIDDEN,
        RegistrationError::DuplicatePath { .. } => StatusCode::CONFLICT,
        RegistrationError::HandlerNotFound { .. } | RegistrationError::LoadFailed { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

/// `POST <registration_endpoint>`.
pub async fn register(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request = match ServiceRequest::from_http(request, state.config.limits.max_body_bytes).await {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };
    let registration = RegistrationRequest::from_request(&request);

    tracing::info!(
        request_id = %request.request_id,
        endpoint = %registration.endpoint,
        path_to_source = %registration.path_to_source,
        "Registration requested"
    );

    // Loading reads the handler source while the registry write lock is held.
    let registry = state.registry.clone();
    let result = tokio::task::spawn_blocking(move || {
        registry.register(&registration.endpoint, &registration.path_to_source)
    })
    .await;

    match result {
        Ok(Ok(_)) => (
            StatusCode::OK,
            state.config.expected_registration_output.clone(),
        )
            .into_response(),
        Ok(Err(e)) => (registration_status(&e), e.to_string()).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request.request_id, error = %e, "Registration task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed").into_response()
        }
    }
}
