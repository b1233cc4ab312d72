//! Route table and outbound request shaping.
//!
//! Only `Authorization` and `Cookie` cross the gateway. The JSON route
//! always sends `Content-Type: application/json`; the multipart route keeps
//! the browser's content type because the boundary inside it must match the
//! untouched body.

use std::fmt;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Inbound headers copied verbatim onto the upstream request.
pub const FORWARDED_HEADERS: [HeaderName; 2] = [header::AUTHORIZATION, header::COOKIE];

/// The streaming routes the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamRoute {
    /// Assistant chat; JSON text body.
    Chat,
    /// Event ingestion; multipart form body.
    Feed,
}

impl StreamRoute {
    /// Path on both the gateway and the upstream.
    pub const fn path(self) -> &'static str {
        match self {
            StreamRoute::Chat => "/api/chat/stream",
            StreamRoute::Feed => "/api/feed/stream",
        }
    }

    /// Short label for logs and metrics.
    pub const fn name(self) -> &'static str {
        match self {
            StreamRoute::Chat => "chat",
            StreamRoute::Feed => "feed",
        }
    }
}

impl fmt::Display for StreamRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Copy the allow-listed headers from an inbound request.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS.iter() {
        for value in inbound.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Build the full header set for the upstream request of `route`.
pub fn outbound_headers(route: StreamRoute, inbound: &HeaderMap) -> HeaderMap {
    let mut headers = forwarded_headers(inbound);
    match route {
        StreamRoute::Chat => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        StreamRoute::Feed => {
            if let Some(content_type) = inbound.get(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, content_type.clone());
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));
        headers
    }

    #[test]
    fn test_only_allow_listed_headers_forwarded() {
        let headers = forwarded_headers(&inbound());
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[header::COOKIE], "session=1");
    }

    #[test]
    fn test_missing_headers_are_not_invented() {
        let headers = forwarded_headers(&HeaderMap::new());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_chat_content_type_is_replaced() {
        let mut headers = inbound();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let out = outbound_headers(StreamRoute::Chat, &headers);
        assert_eq!(out[header::CONTENT_TYPE], "application/json");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_feed_keeps_multipart_boundary() {
        let mut headers = inbound();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=----abc123"),
        );

        let out = outbound_headers(StreamRoute::Feed, &headers);
        assert_eq!(out[header::CONTENT_TYPE], "multipart/form-data; boundary=----abc123");
        assert!(out.get(header::USER_AGENT).is_none());
    }

    #[test]
    fn test_feed_without_content_type() {
        let out = outbound_headers(StreamRoute::Feed, &HeaderMap::new());
        assert!(out.get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(StreamRoute::Chat.path(), "/api/chat/stream");
        assert_eq!(StreamRoute::Feed.path(), "/api/feed/stream");
        assert_eq!(StreamRoute::Feed.to_string(), "feed");
    }
}
