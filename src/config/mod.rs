//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, then API_URL / GATEWAY_BIND_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → moved into HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Resolved once per process; nothing reads the environment afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig, TimeoutConfig,
    UpstreamConfig,
};
