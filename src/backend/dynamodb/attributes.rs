//! # Item Mapping
//!
//! Conversion between `SecretRecord` and DynamoDB items.
//!
//! | Attribute | Type |
//! |---|---|
//! | `secretId` | S (partition key) |
//! | `encryptedSecret` | B (S accepted on read) |
//! | `createdTime`, `lastUpdated` | S, ISO-8601 |
//! | `consumedAtTime` | S, or NULL before consumption |
//! | `TTL` | N, epoch seconds (absent reads as never expiring) |

use crate::error::BackendError;
use crate::model::timestamp::{format_timestamp, parse_timestamp};
use crate::model::{EncryptedSecret, SecretRecord, TtlDeadline};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub(crate) const SECRET_ID: &str = "secretId";
pub(crate) const ENCRYPTED_SECRET: &str = "encryptedSecret";
pub(crate) const CREATED_TIME: &str = "createdTime";
pub(crate) const LAST_UPDATED: &str = "lastUpdated";
pub(crate) const CONSUMED_AT_TIME: &str = "consumedAtTime";
pub(crate) const TTL: &str = "TTL";

type Item = HashMap<String, AttributeValue>;

/// Full item for a put request
pub fn record_to_item(record: &SecretRecord) -> Item {
    let consumed_at = record
        .consumed_at_time
        .as_ref()
        .map_or(AttributeValue::Null(true), |at| {
            AttributeValue::S(format_timestamp(at))
        });

    HashMap::from([
        (SECRET_ID.to_owned(), AttributeValue::S(record.secret_id.clone())),
        (
            ENCRYPTED_SECRET.to_owned(),
            AttributeValue::B(Blob::new(record.encrypted_secret.as_bytes().to_vec())),
        ),
        (
            CREATED_TIME.to_owned(),
            AttributeValue::S(format_timestamp(&record.created_time)),
        ),
        (
            LAST_UPDATED.to_owned(),
            AttributeValue::S(format_timestamp(&record.last_updated)),
        ),
        (CONSUMED_AT_TIME.to_owned(), consumed_at),
        (TTL.to_owned(), AttributeValue::N(record.ttl.to_string())),
    ])
}

/// Parse an item returned by get/update
///
/// # Errors
///
/// Returns a `MalformedRecord` error if a required attribute is missing or
/// has the wrong type.
pub fn item_to_record(item: &Item) -> Result<SecretRecord, BackendError> {
    Ok(SecretRecord {
        secret_id: string(item, SECRET_ID)?.to_owned(),
        encrypted_secret: payload(item)?,
        created_time: timestamp(item, CREATED_TIME)?,
        last_updated: timestamp(item, LAST_UPDATED)?,
        consumed_at_time: optional_timestamp(item, CONSUMED_AT_TIME)?,
        ttl: ttl(item)?,
    })
}

fn required<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue, BackendError> {
    item.get(name)
        .ok_or_else(|| BackendError::malformed(format!("missing attribute {name}")))
}

fn wrong_type(name: &str, expected: &str) -> BackendError {
    BackendError::malformed(format!("attribute {name} is not of type {expected}"))
}

fn string<'a>(item: &'a Item, name: &str) -> Result<&'a str, BackendError> {
    match required(item, name)? {
        AttributeValue::S(value) => Ok(value),
        _ => Err(wrong_type(name, "S")),
    }
}

fn payload(item: &Item) -> Result<EncryptedSecret, BackendError> {
    match required(item, ENCRYPTED_SECRET)? {
        AttributeValue::B(blob) => Ok(EncryptedSecret::new(blob.clone().into_inner())),
        // Older writers stored the ciphertext as a string
        AttributeValue::S(text) => Ok(EncryptedSecret::from(text.as_str())),
        _ => Err(wrong_type(ENCRYPTED_SECRET, "B")),
    }
}

fn parse(name: &str, raw: &str) -> Result<DateTime<Utc>, BackendError> {
    parse_timestamp(raw)
        .map_err(|err| BackendError::malformed(format!("attribute {name} is not ISO-8601: {err}")))
}

fn timestamp(item: &Item, name: &str) -> Result<DateTime<Utc>, BackendError> {
    parse(name, string(item, name)?)
}

fn optional_timestamp(item: &Item, name: &str) -> Result<Option<DateTime<Utc>>, BackendError> {
    match item.get(name) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::S(raw)) => parse(name, raw).map(Some),
        Some(_) => Err(wrong_type(name, "S")),
    }
}

fn ttl(item: &Item) -> Result<TtlDeadline, BackendError> {
    let raw = match item.get(TTL) {
        None | Some(AttributeValue::Null(_)) => return Ok(TtlDeadline::NEVER),
        Some(AttributeValue::N(raw)) => raw,
        Some(_) => return Err(wrong_type(TTL, "N")),
    };
    raw.parse::<i64>()
        .map(TtlDeadline::from_epoch_seconds)
        .map_err(|err| BackendError::malformed(format!("attribute {TTL} is not an integer: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendFailureReason;
    use chrono::{TimeDelta, TimeZone};

    fn sample() -> SecretRecord {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let payload = vec![0_u8, 159, 146, 150].into();
        SecretRecord::new_active("abc", payload, now, TimeDelta::minutes(5))
    }

    #[test]
    fn test_unconsumed_record_writes_null_consumption() {
        let item = record_to_item(&sample());
        assert_eq!(item.get(CONSUMED_AT_TIME), Some(&AttributeValue::Null(true)));
        assert_eq!(
            item.get(CREATED_TIME),
            Some(&AttributeValue::S("2024-05-01T12:00:00.000Z".to_owned()))
        );
        assert_eq!(item.get(TTL), Some(&AttributeValue::N("1714565100".to_owned())));
    }

    #[test]
    fn test_consumed_record_survives_item_conversion() {
        let mut record = sample();
        let read_at = record.created_time + TimeDelta::seconds(1);
        record.mark_consumed(read_at, TtlDeadline::after(read_at, TimeDelta::seconds(30)));

        let parsed = item_to_record(&record_to_item(&record)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_string_payload_is_accepted() {
        let mut item = record_to_item(&sample());
        item.insert(
            ENCRYPTED_SECRET.to_owned(),
            AttributeValue::S("legacy-ciphertext".to_owned()),
        );
        let parsed = item_to_record(&item).unwrap();
        assert_eq!(parsed.encrypted_secret.as_bytes(), b"legacy-ciphertext");
    }

    #[test]
    fn test_missing_ttl_never_expires() {
        let mut item = record_to_item(&sample());
        item.remove(TTL);
        let parsed = item_to_record(&item).unwrap();
        assert_eq!(parsed.ttl, TtlDeadline::NEVER);
        assert!(!parsed.is_expired_at(Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_string_ttl_is_malformed() {
        let mut item = record_to_item(&sample());
        item.insert(TTL.to_owned(), AttributeValue::S("1714565100".to_owned()));
        let err = item_to_record(&item).unwrap_err();
        assert_eq!(err.reason, BackendFailureReason::MalformedRecord);
        assert!(err.message.contains("TTL"));
    }

    #[test]
    fn test_non_integer_ttl_is_malformed() {
        let mut item = record_to_item(&sample());
        item.insert(TTL.to_owned(), AttributeValue::N("12.5".to_owned()));
        assert!(item_to_record(&item).is_err());
    }
}
