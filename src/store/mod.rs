//! # Secret Store
//!
//! Lifecycle of one-time-readable secrets on top of a `KeyValueBackend`:
//!
//! 1. **create** - conditional put; an existing id is left untouched
//! 2. **fetch_and_consume** - read, check logical expiry, then a conditional
//!    update that shortens the TTL to the grace window and stamps
//!    `consumedAtTime`
//! 3. **delete** - unconditional removal
//!
//! Physical removal is left to the backend's reaper, so every read re-checks
//! the TTL rather than trusting that expired rows are gone.
//!
//! Each operation is a fixed sequence of independent backend requests. The
//! store holds no locks or caches and is safe to share behind an `Arc`.

mod options;

pub use options::{ConsumeGuarantee, StoreOptions};

use crate::backend::{ConsumeUpdate, DynamoDbBackend, KeyValueBackend, PutOutcome, UpdateOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{BackendError, Operation, StoreError};
use crate::model::{CreateOutcome, DeleteOutcome, EncryptedSecret, FetchOutcome, SecretRecord};
use crate::observability::{events, metrics};
use chrono::TimeDelta;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

/// Why a fetch delivered nothing; only ever used as a metrics label
#[derive(Debug, Clone, Copy)]
enum NotFoundReason {
    Absent,
    Expired,
    AlreadyConsumed,
    /// The record disappeared or was consumed between the read and the update
    LostRace,
}

impl NotFoundReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Expired => "expired",
            Self::AlreadyConsumed => "already_consumed",
            Self::LostRace => "lost_race",
        }
    }
}

/// One-time secret store over a backend handle and a clock
#[derive(Debug)]
pub struct SecretStore<B, C = SystemClock> {
    backend: B,
    clock: C,
    options: StoreOptions,
}

impl SecretStore<DynamoDbBackend, SystemClock> {
    /// Open a DynamoDB-backed store at process start
    pub async fn open(config: &StoreConfig) -> Self {
        let backend = DynamoDbBackend::connect(config).await;
        let store = Self::new(backend, SystemClock, config.store_options());
        info!(
            table = %config.table_name,
            grace_window_secs = config.grace_window_secs,
            consume_guarantee = %config.consume_guarantee,
            "Opened secret store"
        );
        store
    }
}

impl<B, C> SecretStore<B, C>
where
    B: KeyValueBackend,
    C: Clock,
{
    pub fn new(backend: B, clock: C, options: StoreOptions) -> Self {
        Self {
            backend,
            clock,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Store a secret that expires `ttl` after now unless read first
    ///
    /// An existing record with the same id wins: the call returns
    /// `CreateOutcome::AlreadyExists` and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when the backend request fails.
    pub async fn create(
        &self,
        secret_id: &str,
        encrypted_secret: impl Into<EncryptedSecret>,
        ttl: TimeDelta,
    ) -> Result<CreateOutcome, StoreError> {
        let started = Instant::now();
        let now = self.clock.now();
        let record = SecretRecord::new_active(secret_id, encrypted_secret.into(), now, ttl);
        let span = info_span!(
            "secret_store.create",
            secret_id = %secret_id,
            backend = self.backend.name()
        );

        let result = self.backend.put_if_absent(&record).instrument(span).await;
        metrics::observe_operation_duration(Operation::Create, started.elapsed().as_secs_f64());

        match result {
            Ok(PutOutcome::Stored) => {
                metrics::increment_created();
                debug!(secret_id, expires_at = %record.ttl, "Stored secret");
                Ok(CreateOutcome::Created)
            }
            Ok(PutOutcome::ConditionFailed) => {
                metrics::increment_create_conflicts();
                events::record_create_conflict(secret_id, ttl);
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(err) => Err(fail(Operation::Create, secret_id, err)),
        }
    }

    /// Deliver a secret and start its grace window
    ///
    /// Returns `FetchOutcome::NotFound` for ids that never existed, have
    /// passed their TTL, or (under `ConsumeGuarantee::ExactlyOnce`) were
    /// already consumed. Expired records are not touched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when a backend request fails.
    pub async fn fetch_and_consume(&self, secret_id: &str) -> Result<FetchOutcome, StoreError> {
        let started = Instant::now();
        let span = info_span!(
            "secret_store.fetch_and_consume",
            secret_id = %secret_id,
            backend = self.backend.name(),
            guarantee = %self.options.consume_guarantee
        );

        let result = self.consume(secret_id).instrument(span).await;
        metrics::observe_operation_duration(Operation::Fetch, started.elapsed().as_secs_f64());
        result
    }

    async fn consume(&self, secret_id: &str) -> Result<FetchOutcome, StoreError> {
        let now = self.clock.now();

        let current = self
            .backend
            .get(secret_id)
            .await
            .map_err(|err| fail(Operation::Fetch, secret_id, err))?;

        let Some(current) = current else {
            return Ok(not_found(NotFoundReason::Absent));
        };

        // Logically expired rows may still be waiting for the reaper
        if current.is_expired_at(now) {
            debug!(secret_id, ttl = %current.ttl, "Secret past its TTL");
            return Ok(not_found(NotFoundReason::Expired));
        }

        let guarantee = self.options.consume_guarantee;
        if guarantee == ConsumeGuarantee::ExactlyOnce && current.is_consumed() {
            return Ok(not_found(NotFoundReason::AlreadyConsumed));
        }

        let update = ConsumeUpdate::new(now, self.options.grace_window, guarantee.condition());
        match self.backend.update_if_exists(secret_id, &update).await {
            Ok(UpdateOutcome::Updated(record)) => {
                metrics::increment_consumed();
                info!(
                    secret_id,
                    reaped_after = %record.ttl,
                    "Delivered secret, grace window started"
                );
                Ok(FetchOutcome::Consumed(record))
            }
            Ok(UpdateOutcome::ConditionFailed) => Ok(not_found(NotFoundReason::LostRace)),
            Err(err) => Err(fail(Operation::Fetch, secret_id, err)),
        }
    }

    /// Remove a secret regardless of its state
    ///
    /// Deleting an absent id succeeds with `DeleteOutcome::NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when the backend request fails.
    pub async fn delete(&self, secret_id: &str) -> Result<DeleteOutcome, StoreError> {
        let started = Instant::now();
        let span = info_span!(
            "secret_store.delete",
            secret_id = %secret_id,
            backend = self.backend.name()
        );

        let result = self.backend.delete(secret_id).instrument(span).await;
        metrics::observe_operation_duration(Operation::Delete, started.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                metrics::increment_deleted(outcome);
                debug!(secret_id, outcome = outcome.as_str(), "Deleted secret");
                Ok(outcome)
            }
            Err(err) => Err(fail(Operation::Delete, secret_id, err)),
        }
    }

    /// Shut the store down, releasing the backend handle
    pub fn close(self) {
        info!(backend = self.backend.name(), "Closing secret store");
    }
}

/// Record an unexpected backend failure, then hand it back as the operation's error
fn fail(operation: Operation, secret_id: &str, err: BackendError) -> StoreError {
    metrics::increment_backend_errors(operation, err.reason);
    events::record_backend_failure(operation, secret_id, &err);
    StoreError::backend(operation, secret_id, err)
}

fn not_found(reason: NotFoundReason) -> FetchOutcome {
    metrics::increment_fetch_not_found(reason.as_str());
    FetchOutcome::NotFound
}
