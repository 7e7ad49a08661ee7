//! # Store Events
//!
//! Structured log events for the outcomes operators need to see. Each event
//! carries `title`, `severity`, `error`, and the identifiers involved.
//! The payload is never logged.

use crate::error::{BackendError, Operation};
use chrono::TimeDelta;
use tracing::{error, warn};

/// Severity attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// A create hit an existing id; the stored record was left as is
pub fn record_create_conflict(secret_id: &str, ttl: TimeDelta) {
    warn!(
        title = Operation::Create.failure_title(),
        severity = Severity::Warn.as_str(),
        error = "secret already exists",
        operation = Operation::Create.as_str(),
        secret_id,
        ttl_secs = ttl.num_seconds(),
        "Secret id already in use, keeping existing record"
    );
}

/// A backend request failed unexpectedly and the error is being returned
pub fn record_backend_failure(operation: Operation, secret_id: &str, err: &BackendError) {
    error!(
        title = operation.failure_title(),
        severity = Severity::Error.as_str(),
        error = %err,
        reason = err.reason.as_str(),
        transient = err.is_transient,
        remediation = err.remediation(),
        operation = operation.as_str(),
        secret_id,
        "{}", operation.failure_title()
    );
}
