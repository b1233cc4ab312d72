//! Route handlers for the two streaming endpoints.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::forward::{outbound_headers, StreamRoute};
use crate::proxy::relay::streaming_response;
use crate::proxy::upstream::{has_stream_body, read_error_body};

/// POST /api/chat/stream
///
/// The body is raw JSON text and is forwarded byte-for-byte.
pub async fn handle_chat_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let upstream_body = reqwest::Body::from(body);
    forward(&state, StreamRoute::Chat, &headers, upstream_body).await
}

/// POST /api/feed/stream
///
/// The multipart body is streamed to the upstream while it is still being
/// received; it is never parsed or re-encoded.
pub async fn handle_feed_stream(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let upstream_body = streamed_body(body);
    forward(&state, StreamRoute::Feed, &parts.headers, upstream_body).await
}

fn streamed_body(body: Body) -> reqwest::Body {
    reqwest::Body::wrap_stream(body.into_data_stream().map_err(axum::Error::into_inner))
}

async fn forward(
    state: &AppState,
    route: StreamRoute,
    inbound: &HeaderMap,
    body: reqwest::Body,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(inbound);

    tracing::debug!(
        request_id = %request_id,
        route = %route,
        upstream = %state.upstream.url_for(route),
        "Proxying stream request"
    );

    let opened = tokio::time::timeout(
        state.headers_timeout,
        open_stream(state, route, inbound, body, request_id.clone()),
    )
    .await
    .unwrap_or_else(|_| Err(ProxyError::HeadersTimeout(state.headers_timeout.as_secs())));

    let response = match opened {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ProxyError::Connect(e) => tracing::error!(
                    request_id = %request_id,
                    route = %route,
                    error = %e,
                    "Upstream request failed"
                ),
                ProxyError::HeadersTimeout(secs) => tracing::error!(
                    request_id = %request_id,
                    route = %route,
                    timeout_secs = secs,
                    "Upstream response headers timed out"
                ),
                ProxyError::Upstream { status, .. } => tracing::warn!(
                    request_id = %request_id,
                    route = %route,
                    status = %status,
                    "Upstream returned error status"
                ),
                ProxyError::MissingBody => tracing::error!(
                    request_id = %request_id,
                    route = %route,
                    "Upstream returned no body"
                ),
            }
            err.into_response()
        }
    };

    metrics::record_request(route.name(), response.status().as_u16(), start_time);
    response
}

/// Everything up to the point where the client response is committed.
///
/// Bounded by `AppState::headers_timeout` in `forward`.
async fn open_stream(
    state: &AppState,
    route: StreamRoute,
    inbound: &HeaderMap,
    body: reqwest::Body,
    request_id: String,
) -> Result<Response, ProxyError> {
    let upstream = state
        .upstream
        .post(route, outbound_headers(route, inbound), body)
        .await?;

    let status = upstream.status();
    if !status.is_success() {
        let body = read_error_body(upstream).await;
        return Err(ProxyError::Upstream { status, body });
    }

    if !has_stream_body(&upstream) {
        return Err(ProxyError::MissingBody);
    }

    Ok(streaming_response(upstream, route, request_id))
}
