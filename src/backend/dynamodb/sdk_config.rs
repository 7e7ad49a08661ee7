//! # AWS SDK Configuration
//!
//! Builds the shared SDK config used by the DynamoDB client.

use crate::config::StoreConfig;
use aws_config::SdkConfig;
use tracing::info;

/// Create AWS SDK config using the default credential chain
///
/// Credentials come from the environment, profile, or an attached role.
/// `config.endpoint_url` routes requests elsewhere, e.g. to DynamoDB Local.
pub async fn create_sdk_config(config: &StoreConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        info!("Routing DynamoDB requests to {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}
