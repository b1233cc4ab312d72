//! Failures that happen before the first byte reaches the client.
//!
//! Everything here becomes a JSON response. Failures after streaming has
//! begun never reach this type; the relay task absorbs them.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every gateway-local error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream could not be reached or the exchange failed before
    /// response headers arrived.
    #[error("Failed to connect to upstream: {0}")]
    Connect(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status. Passed through as-is.
    #[error("Upstream returned {status}")]
    Upstream { status: StatusCode, body: Bytes },

    /// The upstream did not produce response headers within the request
    /// deadline.
    #[error("Upstream did not respond within {0}s")]
    HeadersTimeout(u64),

    /// The upstream answered 2xx but with nothing to stream.
    #[error("No response body from upstream")]
    MissingBody,
}

impl ProxyError {
    /// Status code the client will see.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Connect(_) | ProxyError::HeadersTimeout(_) | ProxyError::MissingBody => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Upstream { status, body } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                response
            }
            other => {
                let status = other.status();
                let body = ErrorBody {
                    detail: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
