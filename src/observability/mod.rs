//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration, lifecycle and dispatch produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached by the HTTP layer and shows up in trace spans
//! - Installing either sink is the embedder's choice; the library only emits

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
