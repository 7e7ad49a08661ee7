//! # Store Options
//!
//! Consumption behaviour: grace window length and delivery guarantee.

use crate::backend::ConsumeCondition;
use crate::constants::DEFAULT_GRACE_WINDOW_SECS;
use crate::error::StoreError;
use chrono::TimeDelta;
use std::fmt;
use std::str::FromStr;

/// Delivery contract of `fetch_and_consume`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumeGuarantee {
    /// The consuming update only requires the record to exist.
    ///
    /// Concurrent readers that both pass the expiry check each receive the
    /// payload, and so does any reader arriving before the grace deadline.
    /// Each successful read re-stamps `consumedAtTime` and the TTL.
    #[default]
    WithinGraceWindow,
    /// The consuming update also requires `consumedAtTime` to be unset, so
    /// exactly one reader ever receives the payload.
    ExactlyOnce,
}

impl ConsumeGuarantee {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WithinGraceWindow => "within-grace-window",
            Self::ExactlyOnce => "exactly-once",
        }
    }

    pub(crate) fn condition(self) -> ConsumeCondition {
        match self {
            Self::WithinGraceWindow => ConsumeCondition::Exists,
            Self::ExactlyOnce => ConsumeCondition::ExistsAndUnconsumed,
        }
    }
}

impl fmt::Display for ConsumeGuarantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsumeGuarantee {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "within-grace-window" | "at-least-once" => Ok(Self::WithinGraceWindow),
            "exactly-once" => Ok(Self::ExactlyOnce),
            other => Err(StoreError::config(format!(
                "unknown consume guarantee '{other}' (expected 'within-grace-window' or 'exactly-once')"
            ))),
        }
    }
}

/// Behaviour knobs for `SecretStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Lifetime of a consumed record before the backend may reap it
    pub grace_window: TimeDelta,
    pub consume_guarantee: ConsumeGuarantee,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            grace_window: TimeDelta::seconds(i64::from(DEFAULT_GRACE_WINDOW_SECS)),
            consume_guarantee: ConsumeGuarantee::default(),
        }
    }
}

impl StoreOptions {
    #[must_use]
    pub fn with_grace_window(mut self, grace_window: TimeDelta) -> Self {
        self.grace_window = grace_window;
        self
    }

    #[must_use]
    pub fn with_consume_guarantee(mut self, consume_guarantee: ConsumeGuarantee) -> Self {
        self.consume_guarantee = consume_guarantee;
        self
    }
}
