//! Debug logging of HTTP exchanges.

use std::fmt::Write;

use reqwest::header::{HeaderMap, AUTHORIZATION};

use crate::response::ResponseWrapper;
use crate::transport::HttpRequest;

/// Maximum number of entity bytes written per logged message.
pub const MAX_LOGGED_ENTITY_BYTES: usize = 128 * 1024;

/// Marker appended to truncated entities.
pub const TRUNCATION_MARKER: &str = "...more...";

/// Logs an outgoing request with its headers and a capped body.
pub fn log_request(request: &HttpRequest, max_entity_bytes: usize) {
    let body = request
        .body
        .as_deref()
        .map(|body| render_entity(body, max_entity_bytes));

    tracing::info!(
        target: "maileon",
        method = %request.method,
        url = %request.url,
        headers = %render_headers(&request.headers),
        body = body.as_deref().unwrap_or("<empty>"),
        "Sending request"
    );
}

/// Logs a received response with its headers and a capped body.
pub fn log_response(response: &ResponseWrapper, max_entity_bytes: usize) {
    let body = response
        .body()
        .map(|body| render_entity(body, max_entity_bytes));

    tracing::info!(
        target: "maileon",
        status = response.status_code(),
        reason = response.reason_phrase(),
        headers = %render_headers(response.headers()),
        body = body.as_deref().unwrap_or("<empty>"),
        "Received response"
    );
}

/// Renders headers one per line, with credentials masked.
pub fn render_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        let value = if *name == AUTHORIZATION || value.is_sensitive() {
            "[REDACTED]"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        let _ = write!(out, "\n> {}: {}", name, value);
    }
    out
}

/// Renders an entity as text, cut after `max_bytes` bytes.
pub fn render_entity(body: &[u8], max_bytes: usize) -> String {
    if body.len() <= max_bytes {
        return String::from_utf8_lossy(body).into_owned();
    }
    let mut text = String::from_utf8_lossy(&body[..max_bytes]).into_owned();
    text.push_str(TRUNCATION_MARKER);
    text
}
