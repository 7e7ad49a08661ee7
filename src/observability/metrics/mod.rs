//! # Metrics Module
//!
//! Prometheus metrics for store operations.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration, and text rendering
//! - `store_metrics` - Per-operation counters and latency histogram

pub mod registry;
pub mod store_metrics;

pub use registry::*;
pub use store_metrics::*;
