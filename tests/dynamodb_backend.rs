//! # DynamoDB Backend Tests
//!
//! Runs `DynamoDbBackend` against an in-process HTTP endpoint speaking the
//! DynamoDB JSON protocol. Verifies:
//! - conditional check failures become ordinary outcomes, not errors
//! - the consuming update binds `:nullType` only for exactly-once reads
//! - deletes report absence from the returned old attributes
//! - other service errors keep their classification

mod common;

use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::{Client, Config};
use chrono::TimeDelta;
use common::t0;
use serde_json::{json, Value};
use vanishing_secrets::backend::{ConsumeCondition, ConsumeUpdate, PutOutcome, UpdateOutcome};
use vanishing_secrets::{
    BackendFailureReason, CreateOutcome, DeleteOutcome, DynamoDbBackend, KeyValueBackend,
    ManualClock, SecretRecord, SecretStore, StoreOptions,
};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE: &str = "VanishingKeys-secrets-test";
const JSON_1_0: &str = "application/x-amz-json-1.0";

fn backend(server: &MockServer) -> DynamoDbBackend {
    let config = Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(server.uri())
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
        .retry_config(RetryConfig::disabled())
        .build();
    DynamoDbBackend::from_client(Client::from_conf(config), TABLE)
}

async fn respond(server: &MockServer, target: &str, status: u16, body: &Value) {
    Mock::given(method("POST"))
        .and(header("x-amz-target", format!("DynamoDB_20120810.{target}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), JSON_1_0))
        .mount(server)
        .await;
}

fn service_error(code: &str) -> Value {
    json!({
        "__type": format!("com.amazonaws.dynamodb.v20120810#{code}"),
        "message": "request rejected",
    })
}

fn consumed_item() -> Value {
    json!({
        "secretId": { "S": "abc" },
        "encryptedSecret": { "B": "aGk=" },
        "createdTime": { "S": "2024-05-01T12:00:00.000Z" },
        "lastUpdated": { "S": "2024-05-01T12:00:00.000Z" },
        "consumedAtTime": { "S": "2024-05-01T12:00:01.000Z" },
        "TTL": { "N": "1714564831" },
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

fn sample_record() -> SecretRecord {
    SecretRecord::new_active("abc", "hi".into(), t0(), TimeDelta::minutes(5))
}

#[tokio::test]
async fn test_put_sends_create_once_condition() {
    let server = MockServer::start().await;
    respond(&server, "PutItem", 200, &json!({})).await;
    let backend = backend(&server);

    let outcome = backend.put_if_absent(&sample_record()).await.unwrap();
    assert_eq!(outcome, PutOutcome::Stored);

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["TableName"], backend.table_name());
    assert_eq!(bodies[0]["ConditionExpression"], "attribute_not_exists(secretId)");
    assert_eq!(bodies[0]["Item"]["consumedAtTime"], json!({ "NULL": true }));
}

#[tokio::test]
async fn test_put_condition_failure_is_a_conflict() {
    let server = MockServer::start().await;
    respond(&server, "PutItem", 400, &service_error("ConditionalCheckFailedException")).await;

    let outcome = backend(&server).put_if_absent(&sample_record()).await.unwrap();
    assert_eq!(outcome, PutOutcome::ConditionFailed);
}

#[tokio::test]
async fn test_store_reports_existing_id_on_dynamodb() {
    let server = MockServer::start().await;
    respond(&server, "PutItem", 400, &service_error("ConditionalCheckFailedException")).await;
    let store = SecretStore::new(backend(&server), ManualClock::new(t0()), StoreOptions::default());

    let outcome = store.create("abc", "hi", TimeDelta::minutes(5)).await.unwrap();
    assert_eq!(outcome, CreateOutcome::AlreadyExists);
}

#[tokio::test]
async fn test_update_returns_new_record() {
    let server = MockServer::start().await;
    respond(&server, "UpdateItem", 200, &json!({ "Attributes": consumed_item() })).await;

    let update = ConsumeUpdate::new(t0(), TimeDelta::seconds(30), ConsumeCondition::Exists);
    let outcome = backend(&server).update_if_exists("abc", &update).await.unwrap();

    let UpdateOutcome::Updated(record) = outcome else {
        panic!("expected updated record, got {outcome:?}");
    };
    assert_eq!(record.secret_id, "abc");
    assert_eq!(record.encrypted_secret.as_bytes(), b"hi");
    assert!(record.is_consumed());
}

#[tokio::test]
async fn test_update_condition_failure_is_a_lost_race() {
    let server = MockServer::start().await;
    respond(
        &server,
        "UpdateItem",
        400,
        &service_error("ConditionalCheckFailedException"),
    )
    .await;

    let update =
        ConsumeUpdate::new(t0(), TimeDelta::seconds(30), ConsumeCondition::ExistsAndUnconsumed);
    let outcome = backend(&server).update_if_exists("abc", &update).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::ConditionFailed);
}

#[tokio::test]
async fn test_null_type_bound_only_for_exactly_once() {
    let server = MockServer::start().await;
    respond(&server, "UpdateItem", 200, &json!({ "Attributes": consumed_item() })).await;
    let backend = backend(&server);

    for condition in [ConsumeCondition::Exists, ConsumeCondition::ExistsAndUnconsumed] {
        let update = ConsumeUpdate::new(t0(), TimeDelta::seconds(30), condition);
        backend.update_if_exists("abc", &update).await.unwrap();
    }

    let bodies = request_bodies(&server).await;
    let lenient = &bodies[0]["ExpressionAttributeValues"];
    let strict = &bodies[1]["ExpressionAttributeValues"];
    assert!(lenient.get(":nullType").is_none());
    assert_eq!(strict[":nullType"], json!({ "S": "NULL" }));
    assert_eq!(strict[":consumedAtTime"], json!({ "S": "2024-05-01T12:00:00.000Z" }));
    assert_eq!(bodies[1]["ReturnValues"], "ALL_NEW");
}

#[tokio::test]
async fn test_update_without_attributes_is_malformed() {
    let server = MockServer::start().await;
    respond(&server, "UpdateItem", 200, &json!({})).await;

    let update = ConsumeUpdate::new(t0(), TimeDelta::seconds(30), ConsumeCondition::Exists);
    let err = backend(&server).update_if_exists("abc", &update).await.unwrap_err();
    assert_eq!(err.reason, BackendFailureReason::MalformedRecord);
}

#[tokio::test]
async fn test_delete_with_old_attributes_is_deleted() {
    let server = MockServer::start().await;
    respond(&server, "DeleteItem", 200, &json!({ "Attributes": consumed_item() })).await;

    let outcome = backend(&server).delete("abc").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(request_bodies(&server).await[0]["ReturnValues"], "ALL_OLD");
}

#[tokio::test]
async fn test_delete_without_attributes_is_not_found() {
    let server = MockServer::start().await;
    respond(&server, "DeleteItem", 200, &json!({})).await;

    let outcome = backend(&server).delete("abc").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn test_get_of_absent_item_is_none() {
    let server = MockServer::start().await;
    respond(&server, "GetItem", 200, &json!({})).await;

    assert_eq!(backend(&server).get("abc").await.unwrap(), None);
    assert_eq!(request_bodies(&server).await[0]["ConsistentRead"], true);
}

#[tokio::test]
async fn test_missing_table_is_classified() {
    let server = MockServer::start().await;
    respond(&server, "GetItem", 400, &service_error("ResourceNotFoundException")).await;

    let err = backend(&server).get("abc").await.unwrap_err();
    assert_eq!(err.reason, BackendFailureReason::TableNotFound);
    assert!(!err.is_transient);
}

#[tokio::test]
async fn test_item_without_ttl_is_still_consumed() {
    let server = MockServer::start().await;
    let mut stored = consumed_item();
    stored["consumedAtTime"] = json!({ "NULL": true });
    stored.as_object_mut().unwrap().remove("TTL");
    respond(&server, "GetItem", 200, &json!({ "Item": stored })).await;
    respond(&server, "UpdateItem", 200, &json!({ "Attributes": consumed_item() })).await;
    let store = SecretStore::new(backend(&server), ManualClock::new(t0()), StoreOptions::default());

    let record = store.fetch_and_consume("abc").await.unwrap().into_record().unwrap();
    assert_eq!(record.ttl.epoch_seconds(), 1_714_564_831);
}
