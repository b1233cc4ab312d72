//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers / relay tasks produce:
//!     → logging.rs (structured log events, request-ID spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
