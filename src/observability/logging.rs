//! # Logging
//!
//! `tracing` subscriber setup shared by binaries.

use crate::constants::DEFAULT_LOG_FILTER;
use tracing::warn;

/// Install the global fmt subscriber, honouring `RUST_LOG`
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!("Tracing subscriber already initialized: {}", e);
    }
}
