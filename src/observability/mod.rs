//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding handler produces:
//!     → logging.rs (structured log events, per-request span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Bot tokens are redacted from paths before they are logged
//! - Metrics are cheap and disabled unless configured

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
