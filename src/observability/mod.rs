//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Translator and diagnostic handlers produce:
//!     → logging.rs (structured log events, request ID in fields)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
