//! Chunk relay from the upstream body to the client.
//!
//! # Data Flow
//! ```text
//! upstream body ──next_chunk()──▶ relay task ──send()──▶ mpsc(1) ──▶ Body::from_stream ──▶ client
//! ```
//!
//! The channel holds at most one chunk, so the relay does not read the next
//! upstream chunk until the previous one has been taken by the client side.
//! Dropping the sender ends the client body cleanly; it is dropped on every
//! exit path. A client that leaves while the upstream is idle is noticed
//! without waiting for the next upstream chunk.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    http::StatusCode,
    response::Response,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use crate::http::response::apply_streaming_headers;
use crate::observability::metrics;
use crate::proxy::forward::StreamRoute;

/// Capacity of the channel between the relay task and the client body.
pub const SINK_CAPACITY: usize = 1;

/// Client-facing sink.
pub type ChunkSink = mpsc::Sender<Result<Bytes, Infallible>>;

/// Source of upstream body chunks.
pub trait ChunkReader: Send + 'static {
    type Error: Display + Send;

    /// Next chunk as delivered by the transport, or `None` at end of stream.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, Self::Error>> + Send;
}

impl ChunkReader for reqwest::Response {
    type Error = reqwest::Error;

    async fn next_chunk(&mut self) -> Result<Option<Bytes>, Self::Error> {
        self.chunk().await
    }
}

/// How a relay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream reached end of stream.
    Completed { chunks: u64, bytes: u64 },
    /// The client went away; upstream reading stopped.
    ClientClosed { chunks: u64, bytes: u64 },
    /// Upstream read failed mid-stream.
    UpstreamFailed { chunks: u64, bytes: u64 },
}

impl RelayOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RelayOutcome::Completed { .. } => "completed",
            RelayOutcome::ClientClosed { .. } => "client_closed",
            RelayOutcome::UpstreamFailed { .. } => "upstream_failed",
        }
    }

    pub fn bytes(&self) -> u64 {
        match *self {
            RelayOutcome::Completed { bytes, .. }
            | RelayOutcome::ClientClosed { bytes, .. }
            | RelayOutcome::UpstreamFailed { bytes, .. } => bytes,
        }
    }
}

/// Copy chunks from `reader` to `sink` until either side ends.
///
/// Consumes both; the sink is dropped on return, which closes the client
/// stream. Nothing is batched: each non-empty chunk is sent as soon as it
/// is read.
pub async fn relay<R: ChunkReader>(mut reader: R, sink: ChunkSink) -> RelayOutcome {
    let mut chunks = 0u64;
    let mut bytes = 0u64;

    loop {
        let next = tokio::select! {
            biased;
            _ = sink.closed() => return RelayOutcome::ClientClosed { chunks, bytes },
            next = reader.next_chunk() => next,
        };

        match next {
            Ok(Some(chunk)) => {
                if chunk.is_empty() {
                    continue;
                }
                let len = chunk.len() as u64;
                if sink.send(Ok(chunk)).await.is_err() {
                    return RelayOutcome::ClientClosed { chunks, bytes };
                }
                chunks += 1;
                bytes += len;
            }
            Ok(None) => return RelayOutcome::Completed { chunks, bytes },
            Err(e) => {
                tracing::warn!(error = %e, chunks, bytes, "Upstream stream failed mid-relay");
                return RelayOutcome::UpstreamFailed { chunks, bytes };
            }
        }
    }
}

/// Start relaying `reader` and return the client response immediately.
///
/// The response is committed to 200 with the streaming headers before the
/// first chunk is read.
pub fn streaming_response<R: ChunkReader>(
    reader: R,
    route: StreamRoute,
    request_id: String,
) -> Response {
    let (tx, rx) = mpsc::channel(SINK_CAPACITY);

    let span = tracing::info_span!("relay", request_id = %request_id, route = %route);
    tokio::spawn(
        async move {
            let started = Instant::now();
            let outcome = relay(reader, tx).await;

            match outcome {
                // Already logged by the relay loop.
                RelayOutcome::UpstreamFailed { .. } => {}
                RelayOutcome::ClientClosed { chunks, bytes } => {
                    tracing::debug!(chunks, bytes, "Client disconnected, upstream released")
                }
                RelayOutcome::Completed { chunks, bytes } => tracing::debug!(
                    chunks,
                    bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Stream completed"
                ),
            }
            metrics::record_stream(route.name(), outcome.label(), outcome.bytes());
        }
        .instrument(span),
    );

    let mut response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    *response.status_mut() = StatusCode::OK;
    apply_streaming_headers(response.headers_mut());
    response
}
