//! # Error Types
//!
//! Backend failures are classified so callers can decide on a retry policy.
//! Expected outcomes (conflicts, absent records) are never errors; see
//! `crate::model::outcome`.

use std::fmt;
use thiserror::Error;

/// Unexpected failure reported by a `KeyValueBackend`
#[derive(Debug, Clone, Error)]
#[error("backend request failed: {} - {message}", .reason.as_str())]
pub struct BackendError {
    pub reason: BackendFailureReason,
    pub message: String,
    pub is_transient: bool,
}

impl BackendError {
    pub fn new(reason: BackendFailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            is_transient: reason.is_transient(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendFailureReason::MalformedRecord, message)
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> &'static str {
        self.reason.remediation()
    }
}

/// Classification of backend failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFailureReason {
    /// Request rate or provisioned capacity exceeded (transient)
    Throttled,
    /// Credentials missing, invalid, or lacking permission (permanent)
    PermissionDenied,
    /// Timeout or connection failure before a response arrived (transient)
    Network,
    /// Table does not exist in the configured region (permanent)
    TableNotFound,
    /// Stored item does not match the record schema (permanent)
    MalformedRecord,
    /// Unknown error (assume transient for safety)
    Unknown,
}

impl BackendFailureReason {
    /// Determine if this error is transient (worth retrying) or permanent
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Throttled | Self::Network | Self::Unknown)
    }

    /// Get reason string for metrics labels
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Throttled => "throttled",
            Self::PermissionDenied => "permission_denied",
            Self::Network => "network",
            Self::TableNotFound => "table_not_found",
            Self::MalformedRecord => "malformed_record",
            Self::Unknown => "unknown",
        }
    }

    pub fn remediation(self) -> &'static str {
        match self {
            Self::Throttled => {
                "Request rate exceeded table capacity. Retry with backoff or raise capacity."
            }
            Self::PermissionDenied => {
                "Verify AWS credentials and that the role may read and write the secrets table."
            }
            Self::Network => "Backend unreachable or timed out. This is usually transient - retry.",
            Self::TableNotFound => {
                "Check SECRETS_TABLE_NAME and AWS_REGION point at an existing table."
            }
            Self::MalformedRecord => {
                "A stored item does not match the secret schema. Inspect or delete it."
            }
            Self::Unknown => "Unknown backend error. Check logs for the detailed error message.",
        }
    }
}

/// Store operation names, used in errors, logs, and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Fetch,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Fetch => "fetch",
            Self::Delete => "delete",
        }
    }

    /// Title attached to observability events for failures of this operation
    pub fn failure_title(self) -> &'static str {
        match self {
            Self::Create => "Failed to store secret",
            Self::Fetch => "Failed to fetch secret",
            Self::Delete => "Failed to delete secret",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by `SecretStore` and its configuration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed for secret {secret_id}: {source}")]
    Backend {
        operation: Operation,
        secret_id: String,
        #[source]
        source: BackendError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn backend(
        operation: Operation,
        secret_id: impl Into<String>,
        source: BackendError,
    ) -> Self {
        Self::Backend {
            operation,
            secret_id: secret_id.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Failure reason of the underlying backend error, if any
    pub fn backend_reason(&self) -> Option<BackendFailureReason> {
        match self {
            Self::Backend { source, .. } => Some(source.reason),
            Self::Config(_) => None,
        }
    }

    /// True when retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend { source, .. } => source.is_transient,
            Self::Config(_) => false,
        }
    }
}
