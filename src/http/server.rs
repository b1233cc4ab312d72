//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, CORS)
//! - Build the shared upstream client
//! - Bind server to listener and drain on shutdown

use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, SecurityConfig};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::proxy::forward::StreamRoute;
use crate::proxy::handlers::{handle_chat_stream, handle_feed_stream};
use crate::proxy::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    /// Deadline for the upstream to produce response headers.
    pub headers_timeout: Duration,
}

/// HTTP server for the streaming gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts)?;

        tracing::info!(upstream = %upstream.base_url(), "Upstream client ready");

        let state = AppState {
            upstream,
            headers_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route(StreamRoute::Chat.path(), post(handle_chat_stream))
            .route(StreamRoute::Feed.path(), post(handle_feed_stream))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size));

        let router = match cors_layer(&config.security) {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id(req.headers())
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Run the server until `shutdown` fires, then drain open connections.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn health_handler() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    let origins = &security.cors_allowed_origins;
    if origins.is_empty() {
        return None;
    }

    // Credentials cannot be combined with wildcards, so `*` stays
    // anonymous and only an explicit origin list lets cookies through.
    if origins.iter().any(|o| o == "*") {
        return Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(values))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
            .expose_headers([X_REQUEST_ID]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_disabled_by_default() {
        assert!(cors_layer(&SecurityConfig::default()).is_none());
    }

    #[test]
    fn test_cors_enabled_with_origins() {
        let security = SecurityConfig {
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            ..SecurityConfig::default()
        };
        assert!(cors_layer(&security).is_some());
    }

    #[test]
    fn test_server_builds_from_defaults() {
        let server = HttpServer::new(GatewayConfig::default()).unwrap();
        assert_eq!(server.config().upstream.base_url, "http://localhost:8000");
    }
}
