//! # Background Reaper
//!
//! Periodically removes records whose TTL has passed, standing in for the
//! managed store's native expiry.

use super::InMemoryBackend;
use crate::clock::Clock;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, Instrument};

/// Shortest sweep period; shorter requests are raised to this
pub const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// Sweep `backend` every `interval` using `clock` for "now"
///
/// The task runs until the returned handle is aborted.
pub fn spawn_reaper<C>(backend: InMemoryBackend, clock: C, interval: Duration) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    let interval = interval.max(MIN_REAP_INTERVAL);
    let span = tracing::info_span!("memory.reaper", interval = ?interval);
    tokio::spawn(
        async move {
            info!("Starting in-memory TTL reaper");
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                backend.reap_expired(clock.now()).await;
            }
        }
        .instrument(span),
    )
}
