//! Response header handling.
//!
//! # Responsibilities
//! - Mark streaming responses so no intermediary buffers them
//! - Keep streaming responses free of `Content-Length`
//!
//! # Design Decisions
//! - All four streaming headers are always set together; dropping any one
//!   lets a proxy or CDN hold the body until it completes

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Vendor header honoured by nginx and similar proxies.
pub const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Set the Server-Sent Events headers on a streaming response.
pub fn apply_streaming_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-transform"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(X_ACCEL_BUFFERING, HeaderValue::from_static("no"));
    headers.remove(header::CONTENT_LENGTH);
}
