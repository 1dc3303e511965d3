//! Built-in meta-endpoints.
//!
//! - `/`: HTML listing of registered endpoints
//! - test endpoint: fixed probe output
//! - endpoints endpoint: JSON array of registered endpoints
//!
//! Their paths are reserved in the registry, so a dynamic route can never
//! shadow them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};

use crate::http::server::AppState;

/// Title line of the root listing.
const ROOT_TITLE: &str = "dynroute";

pub async fn root(State(state): State<AppState>) -> Html<String> {
    Html(render_listing(&state.registry.list_endpoints()))
}

pub async fn probe(State(state): State<AppState>) -> Response {
    (StatusCode::OK, state.config.expected_test_output.clone()).into_response()
}

pub async fn endpoints(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.list_endpoints())
}

/// Render the root page for `endpoints`, in the given order.
pub fn render_listing(endpoints: &[String]) -> String {
    let mut output = format!("{}<br><br>Registered endpoints..<ul>", ROOT_TITLE);
    for endpoint in endpoints {
        output.push_str("<li>");
        output.push_str(&escape_html(endpoint));
        output.push_str("</li>");
    }
    output.push_str("</ul>");
    output
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_listing_keeps_order_and_escapes() {
        let html = render_listing(&["/b".into(), "/a<script>".into()]);
        assert_eq!(
            html,
            "dynroute<br><br>Registered endpoints..<ul><li>/b</li><li>/a&lt;script&gt;</li></ul>"
        );
    }

    #[test]
    fn test_render_empty_listing() {
        assert!(render_listing(&[]).ends_with("<ul></ul>"));
    }
}
