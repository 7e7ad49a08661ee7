//! # Secret Record
//!
//! One persisted row per secret id. The JSON form matches the stored schema:
//!
//! ```json
//! {
//!   "secretId": "abc",
//!   "encryptedSecret": "<base64>",
//!   "createdTime": "2024-05-01T12:00:00.000Z",
//!   "lastUpdated": "2024-05-01T12:00:00.000Z",
//!   "consumedAtTime": null,
//!   "TTL": 1714565100
//! }
//! ```

use super::payload::EncryptedSecret;
use super::timestamp::iso8601;
use super::ttl::TtlDeadline;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A stored secret and its lifecycle timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    /// Caller-supplied primary key
    pub secret_id: String,
    /// Ciphertext, returned verbatim on consumption
    pub encrypted_secret: EncryptedSecret,
    /// Set once at creation
    #[serde(with = "iso8601")]
    pub created_time: DateTime<Utc>,
    /// Set at creation; consumption leaves it untouched
    #[serde(with = "iso8601")]
    pub last_updated: DateTime<Utc>,
    /// Stamped by a successful consumption, never cleared afterwards
    #[serde(default, with = "iso8601::option")]
    pub consumed_at_time: Option<DateTime<Utc>>,
    /// Validity deadline while active, grace deadline once consumed
    #[serde(rename = "TTL")]
    pub ttl: TtlDeadline,
}

/// Which of its two meanings the record's TTL currently carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStatus {
    /// Never read; unreadable once `expires` has passed
    Active { expires: TtlDeadline },
    /// Read at `at`; the row lingers until `reaped_after`
    Consumed {
        at: DateTime<Utc>,
        reaped_after: TtlDeadline,
    },
}

impl SecretRecord {
    /// Fresh, unconsumed record expiring `ttl` after `now`
    pub fn new_active(
        secret_id: impl Into<String>,
        encrypted_secret: EncryptedSecret,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            encrypted_secret,
            created_time: now,
            last_updated: now,
            consumed_at_time: None,
            ttl: TtlDeadline::after(now, ttl),
        }
    }

    pub fn status(&self) -> SecretStatus {
        match self.consumed_at_time {
            Some(at) => SecretStatus::Consumed {
                at,
                reaped_after: self.ttl,
            },
            None => SecretStatus::Active { expires: self.ttl },
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at_time.is_some()
    }

    /// Logical expiry: true once the TTL has passed, whether or not the row is gone
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.ttl.is_past(now)
    }

    /// Apply the consuming write: shortened TTL and a consumption stamp
    pub fn mark_consumed(&mut self, at: DateTime<Utc>, grace_deadline: TtlDeadline) {
        self.consumed_at_time = Some(at);
        self.ttl = grace_deadline;
    }
}
