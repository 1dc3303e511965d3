//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, built-in endpoints)
//!     → request.rs (request ID, query + body decoding)
//!     → [dispatcher looks up the live route table]
//!     → response.rs (status, content type, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestError, ServiceRequest, X_REQUEST_ID};
pub use response::ServiceResponse;
pub use server::{AppState, HttpServer};
