//! Registration endpoint.
//!
//! `POST <registration_endpoint>` with `endpoint` and `path_to_source`
//! (form-urlencoded or JSON) registers a new route. Success returns the
//! configured registration output; every rejection returns a non-2xx status
//! with a message naming the failed check.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::post, Router};

use self::auth::registration_auth_middleware;
use self::handlers::register;
use crate::http::server::AppState;

pub use handlers::{registration_status, RegistrationRequest};

/// Router serving the registration endpoint, guarded by the token check.
pub fn setup_registration_router(state: AppState) -> Router<AppState> {
    let path = state.config.registration_endpoint.clone();
    Router::new()
        .route(&path, post(register))
        .route_layer(middleware::from_fn_with_state(
            state,
            registration_auth_middleware,
        ))
}
