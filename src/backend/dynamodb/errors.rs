//! # DynamoDB Error Classification
//!
//! Maps SDK errors onto `BackendFailureReason`. Conditional check failures
//! are not errors at this layer; callers test for them with
//! `is_condition_failure` first.

use crate::error::{BackendError, BackendFailureReason};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

pub(crate) fn is_condition_failure<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.code() == Some(CONDITIONAL_CHECK_FAILED)
}

pub(crate) fn backend_error<E, R>(err: &SdkError<E, R>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let reason = match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => BackendFailureReason::Network,
        _ => classify_error_code(err.code()),
    };
    BackendError::new(reason, DisplayErrorContext(err).to_string())
}

/// Classify a DynamoDB error code
pub fn classify_error_code(code: Option<&str>) -> BackendFailureReason {
    match code {
        Some(
            "ProvisionedThroughputExceededException"
            | "RequestLimitExceeded"
            | "ThrottlingException"
            | "TransactionConflictException",
        ) => BackendFailureReason::Throttled,
        Some(
            "AccessDeniedException"
            | "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "MissingAuthenticationTokenException"
            | "ExpiredTokenException",
        ) => BackendFailureReason::PermissionDenied,
        Some("ResourceNotFoundException") => BackendFailureReason::TableNotFound,
        Some("ServiceUnavailable" | "InternalServerError") => BackendFailureReason::Network,
        _ => BackendFailureReason::Unknown,
    }
}
