//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine / store / publisher produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → fmt subscriber (stderr), filtered by RUST_LOG or config
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Every mutation logs page/section ids and the resulting store version
//! - Every publish carries a UUID so pending/finished events can be correlated
//! - No exporter is installed here; without a recorder metrics calls are no-ops

pub mod logging;
pub mod metrics;
