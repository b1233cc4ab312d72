//! Streaming SSE gateway library.
//!
//! Sits between a browser and the backend API server and relays
//! Server-Sent Event responses chunk by chunk instead of buffering them.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
