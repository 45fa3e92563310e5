//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client proxy, dispatcher, server glue produce:
//!     → logging.rs (tracing events: operation, method, path, status)
//!     → metrics.rs (counters and histograms per operation)
//!
//! Consumers:
//!     → stdout (fmt layer, EnvFilter)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID from the server glue appears in every request span
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
