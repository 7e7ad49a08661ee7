//! # TTL Deadline
//!
//! The single `TTL` attribute the backend's native reaper watches. It carries
//! one of two meanings depending on the record's state:
//!
//! - **Active** record: the validity deadline chosen at creation. Past it, the
//!   secret is unreadable even if the row still exists.
//! - **Consumed** record: the grace deadline written on the first successful
//!   read, shortly after which the backend removes the row.
//!
//! See `SecretStatus` for the tagged view of those two meanings.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expiry instant in whole epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TtlDeadline(i64);

impl TtlDeadline {
    /// Deadline of a row stored without a TTL; the native reaper never removes those
    pub const NEVER: Self = Self(i64::MAX);

    pub const fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn epoch_seconds(self) -> i64 {
        self.0
    }

    /// Deadline `duration` after `now`, rounded to the nearest second (halves round up)
    ///
    /// Negative durations produce a deadline that is already in the past.
    pub fn after(now: DateTime<Utc>, duration: TimeDelta) -> Self {
        let millis = now
            .timestamp_millis()
            .saturating_add(duration.num_milliseconds());
        Self(round_millis_to_seconds(millis))
    }


    /// True when the deadline lies strictly before `now`
    pub fn is_past(self, now: DateTime<Utc>) -> bool {
        self.0.saturating_mul(1_000) < now.timestamp_millis()
    }
}

impl fmt::Display for TtlDeadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn round_millis_to_seconds(millis: i64) -> i64 {
    millis.saturating_add(500).div_euclid(1_000)
}
