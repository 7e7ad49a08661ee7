//! # Metrics Registry
//!
//! Prometheus metrics registry setup and registration.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all metrics with the Prometheus registry
///
/// Only the first call registers; later calls are no-ops.
///
/// # Errors
///
/// Returns an error if a metric fails to register.
pub fn register_metrics() -> Result<()> {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    super::store_metrics::register_store_metrics()
}

/// Render every registered metric in the Prometheus text exposition format
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output was not UTF-8")
}
