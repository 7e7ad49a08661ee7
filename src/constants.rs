//! # Constants
//!
//! Default values shared by configuration, the store, and the CLI.

/// DynamoDB table holding secret records
pub const DEFAULT_TABLE_NAME: &str = "VanishingKeys-secrets-prod";

/// AWS region used when `AWS_REGION` is not set
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Seconds a consumed record stays physically present before the reaper may remove it
pub const DEFAULT_GRACE_WINDOW_SECS: u32 = 30;

/// Default `tracing` filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "vanishing_secrets=info,vsctl=info";

