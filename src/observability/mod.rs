//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, auth gate, handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on the per-request span, so every event inside
//!   a request carries it
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;
