//! # Operation Outcomes
//!
//! Expected results of store operations. Conflicts and absent records are
//! ordinary values here; only backend failures are errors.

use super::record::SecretRecord;

/// Result of `SecretStore::create`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// A record with this id already exists and was left untouched
    AlreadyExists,
}

/// Result of `SecretStore::fetch_and_consume`
///
/// `NotFound` deliberately does not say whether the secret never existed,
/// expired, or was already consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The post-consumption record, carrying the original payload
    Consumed(SecretRecord),
    NotFound,
}

impl FetchOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn into_record(self) -> Option<SecretRecord> {
        match self {
            Self::Consumed(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Result of `SecretStore::delete`; both variants are success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
        }
    }
}
