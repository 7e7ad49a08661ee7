//! # DynamoDB Backend
//!
//! Client for the DynamoDB table holding secret records.
//!
//! This module provides:
//! - Create-once writes (`attribute_not_exists(secretId)`)
//! - Strongly consistent reads
//! - Consuming updates returning the new item (`ReturnValues::AllNew`)
//! - Deletes that report whether anything was removed (`ReturnValues::AllOld`)
//!
//! The table's native TTL feature must be enabled on the `TTL` attribute.

mod attributes;
mod errors;
mod sdk_config;

pub use attributes::{item_to_record, record_to_item};
pub use errors::classify_error_code;
pub use sdk_config::create_sdk_config;

use self::attributes::{CONSUMED_AT_TIME, SECRET_ID, TTL};
use self::errors::{backend_error, is_condition_failure};
use super::{ConsumeCondition, ConsumeUpdate, KeyValueBackend, PutOutcome, UpdateOutcome};
use crate::config::StoreConfig;
use crate::error::BackendError;
use crate::model::timestamp::format_timestamp;
use crate::model::{DeleteOutcome, SecretRecord};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use tracing::{debug, info};

/// DynamoDB-backed secret table
pub struct DynamoDbBackend {
    client: DynamoDbClient,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbBackend")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl DynamoDbBackend {
    /// Build a client from the default AWS credential chain and `config`
    pub async fn connect(config: &StoreConfig) -> Self {
        let sdk_config = create_sdk_config(config).await;
        info!(
            table = %config.table_name,
            region = %config.region,
            "Connected DynamoDB secret backend"
        );
        Self::from_client(DynamoDbClient::new(&sdk_config), config.table_name.clone())
    }

    pub fn from_client(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Condition expression for the consuming update
pub fn consume_condition_expression(condition: ConsumeCondition) -> String {
    match condition {
        ConsumeCondition::Exists => format!("attribute_exists({SECRET_ID})"),
        ConsumeCondition::ExistsAndUnconsumed => format!(
            "attribute_exists({SECRET_ID}) AND (attribute_not_exists(#consumedAtTime) OR attribute_type(#consumedAtTime, :nullType))"
        ),
    }
}

fn secret_key(secret_id: &str) -> AttributeValue {
    AttributeValue::S(secret_id.to_owned())
}

#[async_trait]
impl KeyValueBackend for DynamoDbBackend {
    fn name(&self) -> &'static str {
        "dynamodb"
    }

    async fn put_if_absent(&self, record: &SecretRecord) -> Result<PutOutcome, BackendError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .condition_expression(format!("attribute_not_exists({SECRET_ID})"))
            .send()
            .await;

        match result {
            Ok(_) => Ok(PutOutcome::Stored),
            Err(err) if is_condition_failure(&err) => Ok(PutOutcome::ConditionFailed),
            Err(err) => Err(backend_error(&err)),
        }
    }

    async fn get(&self, secret_id: &str) -> Result<Option<SecretRecord>, BackendError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(SECRET_ID, secret_key(secret_id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| backend_error(&err))?;

        output.item().map(item_to_record).transpose()
    }

    async fn update_if_exists(
        &self,
        secret_id: &str,
        update: &ConsumeUpdate,
    ) -> Result<UpdateOutcome, BackendError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(SECRET_ID, secret_key(secret_id))
            .condition_expression(consume_condition_expression(update.condition))
            .update_expression("SET #ttl = :ttl, #consumedAtTime = :consumedAtTime")
            .expression_attribute_names("#ttl", TTL)
            .expression_attribute_names("#consumedAtTime", CONSUMED_AT_TIME)
            .expression_attribute_values(":ttl", AttributeValue::N(update.ttl.to_string()))
            .expression_attribute_values(
                ":consumedAtTime",
                AttributeValue::S(format_timestamp(&update.consumed_at)),
            )
            .return_values(ReturnValue::AllNew);

        if update.condition == ConsumeCondition::ExistsAndUnconsumed {
            request = request
                .expression_attribute_values(":nullType", AttributeValue::S("NULL".to_owned()));
        }

        match request.send().await {
            Ok(output) => {
                let record = output
                    .attributes()
                    .map(item_to_record)
                    .transpose()?
                    .ok_or_else(|| BackendError::malformed("update returned no attributes"))?;
                Ok(UpdateOutcome::Updated(record))
            }
            Err(err) if is_condition_failure(&err) => {
                debug!(secret_id, "Consume condition failed");
                Ok(UpdateOutcome::ConditionFailed)
            }
            Err(err) => Err(backend_error(&err)),
        }
    }

    async fn delete(&self, secret_id: &str) -> Result<DeleteOutcome, BackendError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(SECRET_ID, secret_key(secret_id))
            .return_values(ReturnValue::AllOld)
            .send()
            .await;

        match result {
            Ok(output) => match output.attributes() {
                Some(old) if !old.is_empty() => Ok(DeleteOutcome::Deleted),
                _ => Ok(DeleteOutcome::NotFound),
            },
            Err(err) if is_condition_failure(&err) => Ok(DeleteOutcome::NotFound),
            Err(err) => Err(backend_error(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_condition_only_requires_existence() {
        assert_eq!(
            consume_condition_expression(ConsumeCondition::Exists),
            "attribute_exists(secretId)"
        );
    }

    #[test]
    fn test_strict_condition_requires_null_consumption() {
        let expression = consume_condition_expression(ConsumeCondition::ExistsAndUnconsumed);
        assert!(expression.starts_with("attribute_exists(secretId) AND"));
        assert!(expression.contains("attribute_not_exists(#consumedAtTime)"));
        assert!(expression.contains("attribute_type(#consumedAtTime, :nullType)"));
    }
}
