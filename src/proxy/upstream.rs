//! Client for the upstream API server.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::HeaderMap;
use reqwest::{Body, Client, Response, StatusCode};

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::proxy::forward::StreamRoute;

/// Shared handle to the upstream. Cheap to clone; connection reuse is left
/// to the underlying `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .tcp_keepalive(Duration::from_secs(60))
            .no_proxy()
            .build()?;

        Ok(Self {
            http_client,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upstream URL for a route.
    pub fn url_for(&self, route: StreamRoute) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// POST `body` to the route's upstream path and wait for response headers.
    pub async fn post(
        &self,
        route: StreamRoute,
        headers: HeaderMap,
        body: impl Into<Body>,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .post(self.url_for(route))
            .headers(headers)
            .body(body)
            .send()
            .await
    }
}

/// Read an upstream error body, falling back to empty bytes.
pub async fn read_error_body(response: Response) -> Bytes {
    match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read upstream error body");
            Bytes::new()
        }
    }
}

/// Whether a successful upstream response has anything to stream.
///
/// Decided from the response head alone, before any chunk is read.
pub fn has_stream_body(response: &Response) -> bool {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return false;
    }
    response.content_length() != Some(0)
}
