//! Permissive CORS headers for the dispatch endpoint.
//!
//! The endpoint is called straight from browsers and the mobile app's web
//! views, so every response except 405 allows any origin.

use axum::http::{HeaderName, HeaderValue, header};

pub const ALLOW_ORIGIN: &str = "*";

pub const ALLOW_METHODS: &str = "POST, OPTIONS";

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Headers attached to preflight, success and failure responses
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ),
    ]
}
