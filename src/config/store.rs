//! # Secret Store Settings
//!
//! | Variable | Default |
//! |---|---|
//! | `SECRETS_TABLE_NAME` | `VanishingKeys-secrets-prod` |
//! | `AWS_REGION` | `us-east-1` |
//! | `DYNAMODB_ENDPOINT` | unset (AWS endpoint) |
//! | `CONSUME_GRACE_WINDOW_SECS` | `30` |
//! | `CONSUME_GUARANTEE` | `within-grace-window` |

use crate::constants::{DEFAULT_AWS_REGION, DEFAULT_GRACE_WINDOW_SECS, DEFAULT_TABLE_NAME};
use crate::error::StoreError;
use crate::store::{ConsumeGuarantee, StoreOptions};
use chrono::TimeDelta;

/// Settings for opening a `SecretStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// DynamoDB table holding secret records
    pub table_name: String,
    pub region: String,
    /// Endpoint override (e.g. DynamoDB Local)
    pub endpoint_url: Option<String>,
    /// How long a consumed record lingers before the backend may reap it
    pub grace_window_secs: u32,
    pub consume_guarantee: ConsumeGuarantee,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_owned(),
            region: DEFAULT_AWS_REGION.to_owned(),
            endpoint_url: None,
            grace_window_secs: DEFAULT_GRACE_WINDOW_SECS,
            consume_guarantee: ConsumeGuarantee::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `CONSUME_GUARANTEE` is not recognised.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `CONSUME_GUARANTEE` is not recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let consume_guarantee = match lookup("CONSUME_GUARANTEE") {
            Some(raw) => raw.parse()?,
            None => ConsumeGuarantee::default(),
        };

        Ok(Self {
            table_name: lookup("SECRETS_TABLE_NAME")
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_owned()),
            region: lookup("AWS_REGION")
                .filter(|region| !region.is_empty())
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_owned()),
            endpoint_url: lookup("DYNAMODB_ENDPOINT").filter(|url| !url.is_empty()),
            grace_window_secs: var_or_default(
                &lookup,
                "CONSUME_GRACE_WINDOW_SECS",
                DEFAULT_GRACE_WINDOW_SECS,
            ),
            consume_guarantee,
        })
    }

    /// Store behaviour derived from this configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            grace_window: TimeDelta::seconds(i64::from(self.grace_window_secs)),
            consume_guarantee: self.consume_guarantee,
        }
    }
}

/// Read a variable or return the default when it is unset or unparsable
fn var_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
