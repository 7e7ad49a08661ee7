//! # Observability
//!
//! - `events` - structured store events (conflicts, backend failures)
//! - `metrics` - Prometheus counters and histograms
//! - `logging` - `tracing` subscriber setup for binaries

pub mod events;
pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
