//! # Key-Value Backends
//!
//! Conditional-write stores that hold secret records.
//!
//! - `memory`: in-process store with a TTL reaper, used by tests and local runs
//! - `dynamodb`: AWS DynamoDB table with native TTL expiry
//!
//! Every call is a single atomic request. Condition failures come back as
//! ordinary outcomes; only unexpected failures are `BackendError`s.

pub mod dynamodb;
pub mod memory;

pub use dynamodb::DynamoDbBackend;
pub use memory::{BackendCall, InMemoryBackend};

use crate::error::BackendError;
use crate::model::{DeleteOutcome, SecretRecord, TtlDeadline};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

/// Outcome of a create-if-absent write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored,
    /// A record with the same id already exists
    ConditionFailed,
}

/// Outcome of a conditional consuming update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record as it reads after the update
    Updated(SecretRecord),
    ConditionFailed,
}

/// Precondition attached to the consuming update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeCondition {
    /// Record exists; an already-consumed record still qualifies
    Exists,
    /// Record exists and `consumedAtTime` is absent or null
    ExistsAndUnconsumed,
}

/// Field updates applied when a secret is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeUpdate {
    pub consumed_at: DateTime<Utc>,
    /// Grace deadline replacing the validity deadline
    pub ttl: TtlDeadline,
    pub condition: ConsumeCondition,
}

impl ConsumeUpdate {
    pub fn new(now: DateTime<Utc>, grace_window: TimeDelta, condition: ConsumeCondition) -> Self {
        Self {
            consumed_at: now,
            ttl: TtlDeadline::after(now, grace_window),
            condition,
        }
    }

    /// Whether a stored record satisfies this update's precondition
    pub fn admits(&self, current: &SecretRecord) -> bool {
        match self.condition {
            ConsumeCondition::Exists => true,
            ConsumeCondition::ExistsAndUnconsumed => !current.is_consumed(),
        }
    }
}

/// Storage contract required by `SecretStore`
#[async_trait]
pub trait KeyValueBackend: Send + Sync + std::fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Write `record` only if no record with its id exists
    async fn put_if_absent(&self, record: &SecretRecord) -> Result<PutOutcome, BackendError>;

    /// Strongly consistent read by id
    async fn get(&self, secret_id: &str) -> Result<Option<SecretRecord>, BackendError>;

    /// Apply `update` if the record exists and satisfies its condition
    async fn update_if_exists(
        &self,
        secret_id: &str,
        update: &ConsumeUpdate,
    ) -> Result<UpdateOutcome, BackendError>;

    /// Remove the record unconditionally; absence is `DeleteOutcome::NotFound`
    async fn delete(&self, secret_id: &str) -> Result<DeleteOutcome, BackendError>;
}
