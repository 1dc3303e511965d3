//! Client for a running dynroute server.

pub mod client;

pub use client::{ClientError, MetaEndpoints, RouteHostClient};
