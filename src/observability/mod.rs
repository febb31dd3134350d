//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware::AccessLog (final status, size, elapsed)
//!     → tracing event "Request served"
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Log filter comes from `RUST_LOG` first, then configuration
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
