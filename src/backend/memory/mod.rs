//! # In-Memory Backend
//!
//! Process-local `KeyValueBackend` with the same conditional semantics as the
//! DynamoDB table. All writes go through one lock, which makes each call
//! atomic the way a single DynamoDB request is.
//!
//! Physical expiry is emulated by `reap_expired` and the background task from
//! `spawn_reaper`. Like the managed reaper, it may lag behind logical expiry.
//!
//! Failures can be injected with `fail_next` / `fail_next_call` to exercise
//! error handling.

mod reaper;

pub use reaper::{spawn_reaper, MIN_REAP_INTERVAL};

use super::{ConsumeUpdate, KeyValueBackend, PutOutcome, UpdateOutcome};
use crate::error::BackendError;
use crate::model::{DeleteOutcome, SecretRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::debug;

/// Backend request kinds, for targeting injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    PutIfAbsent,
    Get,
    UpdateIfExists,
    Delete,
}

/// Failure waiting for a matching call; `None` matches any call
type InjectedFailure = (Option<BackendCall>, BackendError);

/// Shared in-memory table. Clones refer to the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    records: Arc<RwLock<HashMap<String, SecretRecord>>>,
    injected_failures: Arc<Mutex<VecDeque<InjectedFailure>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next backend call fail with `error`
    ///
    /// Queued failures are consumed in order, one per call.
    pub fn fail_next(&self, error: BackendError) {
        self.inject(None, error);
    }

    /// Make the next call of kind `call` fail with `error`; other calls pass
    pub fn fail_next_call(&self, call: BackendCall, error: BackendError) {
        self.inject(Some(call), error);
    }

    fn inject(&self, target: Option<BackendCall>, error: BackendError) {
        self.injected_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((target, error));
    }

    fn take_injected_failure(&self, call: BackendCall) -> Result<(), BackendError> {
        let mut queue = self
            .injected_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let position = queue
            .iter()
            .position(|(target, _)| target.is_none() || *target == Some(call));
        match position.and_then(|index| queue.remove(index)) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    /// Current stored record, bypassing expiry checks and injected failures
    pub async fn peek(&self, secret_id: &str) -> Option<SecretRecord> {
        self.records.read().await.get(secret_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Physically remove every record whose TTL lies before `now`
    ///
    /// Returns the number of records removed.
    pub async fn reap_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        let reaped = before - records.len();
        if reaped > 0 {
            debug!(reaped, "Reaped expired secret records");
        }
        reaped
    }
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put_if_absent(&self, record: &SecretRecord) -> Result<PutOutcome, BackendError> {
        self.take_injected_failure(BackendCall::PutIfAbsent)?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.secret_id) {
            return Ok(PutOutcome::ConditionFailed);
        }
        records.insert(record.secret_id.clone(), record.clone());
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, secret_id: &str) -> Result<Option<SecretRecord>, BackendError> {
        self.take_injected_failure(BackendCall::Get)?;
        Ok(self.records.read().await.get(secret_id).cloned())
    }

    async fn update_if_exists(
        &self,
        secret_id: &str,
        update: &ConsumeUpdate,
    ) -> Result<UpdateOutcome, BackendError> {
        self.take_injected_failure(BackendCall::UpdateIfExists)?;
        let mut records = self.records.write().await;
        match records.get_mut(secret_id) {
            Some(record) if update.admits(record) => {
                record.mark_consumed(update.consumed_at, update.ttl);
                Ok(UpdateOutcome::Updated(record.clone()))
            }
            _ => Ok(UpdateOutcome::ConditionFailed),
        }
    }

    async fn delete(&self, secret_id: &str) -> Result<DeleteOutcome, BackendError> {
        self.take_injected_failure(BackendCall::Delete)?;
        match self.records.write().await.remove(secret_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ConsumeCondition;
    use crate::error::BackendFailureReason;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, payload: &str, ttl: TimeDelta) -> SecretRecord {
        SecretRecord::new_active(id, payload.into(), t0(), ttl)
    }

    #[tokio::test]
    async fn test_put_if_absent_keeps_first_write() {
        let backend = InMemoryBackend::new();
        let first = record("abc", "one", TimeDelta::minutes(5));
        let second = record("abc", "two", TimeDelta::minutes(10));

        assert_eq!(backend.put_if_absent(&first).await.unwrap(), PutOutcome::Stored);
        assert_eq!(
            backend.put_if_absent(&second).await.unwrap(),
            PutOutcome::ConditionFailed
        );
        assert_eq!(backend.peek("abc").await, Some(first));
    }

    #[tokio::test]
    async fn test_update_on_missing_record_fails_condition() {
        let backend = InMemoryBackend::new();
        let update = ConsumeUpdate::new(t0(), TimeDelta::seconds(30), ConsumeCondition::Exists);
        assert_eq!(
            backend.update_if_exists("missing", &update).await.unwrap(),
            UpdateOutcome::ConditionFailed
        );
    }

    #[tokio::test]
    async fn test_strict_update_rejects_consumed_record() {
        let backend = InMemoryBackend::new();
        backend
            .put_if_absent(&record("abc", "one", TimeDelta::minutes(5)))
            .await
            .unwrap();
        let strict =
            ConsumeUpdate::new(t0(), TimeDelta::seconds(30), ConsumeCondition::ExistsAndUnconsumed);

        assert!(matches!(
            backend.update_if_exists("abc", &strict).await.unwrap(),
            UpdateOutcome::Updated(_)
        ));
        assert_eq!(
            backend.update_if_exists("abc", &strict).await.unwrap(),
            UpdateOutcome::ConditionFailed
        );
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let backend = InMemoryBackend::new();
        backend
            .put_if_absent(&record("abc", "one", TimeDelta::minutes(5)))
            .await
            .unwrap();
        assert_eq!(backend.delete("abc").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(backend.delete("abc").await.unwrap(), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_reap_expired_removes_only_past_deadlines() {
        let backend = InMemoryBackend::new();
        backend
            .put_if_absent(&record("old", "x", TimeDelta::seconds(-1)))
            .await
            .unwrap();
        backend
            .put_if_absent(&record("fresh", "y", TimeDelta::minutes(5)))
            .await
            .unwrap();

        assert_eq!(backend.reap_expired(t0()).await, 1);
        assert!(backend.peek("old").await.is_none());
        assert!(backend.peek("fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let backend = InMemoryBackend::new();
        backend.fail_next(BackendError::new(BackendFailureReason::Throttled, "first"));

        let err = backend.get("abc").await.unwrap_err();
        assert_eq!(err.reason, BackendFailureReason::Throttled);
        assert_eq!(backend.get("abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_targeted_failure_skips_other_calls() {
        let backend = InMemoryBackend::new();
        backend.fail_next_call(
            BackendCall::Delete,
            BackendError::new(BackendFailureReason::Network, "timeout"),
        );

        assert_eq!(backend.get("abc").await.unwrap(), None);
        let err = backend.delete("abc").await.unwrap_err();
        assert_eq!(err.reason, BackendFailureReason::Network);
        assert_eq!(backend.delete("abc").await.unwrap(), DeleteOutcome::NotFound);
    }
}
