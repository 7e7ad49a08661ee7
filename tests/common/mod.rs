//! Shared fixtures: an in-memory store driven by a manual clock.

#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]

use chrono::{DateTime, TimeZone, Utc};
use vanishing_secrets::{ConsumeGuarantee, InMemoryBackend, ManualClock, SecretStore, StoreOptions};

pub type TestStore = SecretStore<InMemoryBackend, ManualClock>;

pub struct Harness {
    pub store: TestStore,
    pub backend: InMemoryBackend,
    pub clock: ManualClock,
}

/// 2024-05-01T12:00:00Z
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn harness(guarantee: ConsumeGuarantee) -> Harness {
    let backend = InMemoryBackend::new();
    let clock = ManualClock::new(t0());
    let options = StoreOptions::default().with_consume_guarantee(guarantee);
    Harness {
        store: SecretStore::new(backend.clone(), clock.clone(), options),
        backend,
        clock,
    }
}
