//! Streaming proxy subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/{chat,feed}/stream
//!     → handlers.rs (extract body, request ID)
//!     → forward.rs (allow-listed headers, content type per route)
//!     → upstream.rs (POST {base_url}{path}, wait for status line)
//!         non-2xx   → error.rs (status + body passed through)
//!         no body   → error.rs (502)
//!         send fail → error.rs (502)
//!     → relay.rs (200 + SSE headers now, chunks copied in background)
//! ```
//!
//! # Design Decisions
//! - The client status is decided from the upstream status line alone;
//!   once the relay starts nothing can change it
//! - Mid-stream failures end the client stream without an error event
//! - No state outlives a request

pub mod error;
pub mod forward;
pub mod handlers;
pub mod relay;
pub mod upstream;

pub use error::{ErrorBody, ProxyError};
pub use forward::StreamRoute;
pub use relay::{ChunkReader, RelayOutcome};
pub use upstream::UpstreamClient;
