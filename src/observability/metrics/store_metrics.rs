//! # Store Metrics
//!
//! Metrics for store operations: creates, consumptions, deletes, backend errors.

use crate::error::{BackendFailureReason, Operation};
use crate::model::DeleteOutcome;
use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{HistogramVec, IntCounter, IntCounterVec};
use std::sync::LazyLock;

static CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vanishing_secrets_created_total",
        "Total number of secrets stored",
    )
    .expect("Failed to create CREATED_TOTAL metric - this should never happen")
});

static CREATE_CONFLICTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vanishing_secrets_create_conflicts_total",
        "Total number of creates rejected because the id already existed",
    )
    .expect("Failed to create CREATE_CONFLICTS_TOTAL metric - this should never happen")
});

static CONSUMED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vanishing_secrets_consumed_total",
        "Total number of secrets delivered to a reader",
    )
    .expect("Failed to create CONSUMED_TOTAL metric - this should never happen")
});

static FETCH_NOT_FOUND_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vanishing_secrets_fetch_not_found_total",
            "Total number of fetches that delivered nothing",
        ),
        &["reason"],
    )
    .expect("Failed to create FETCH_NOT_FOUND_TOTAL metric - this should never happen")
});

static DELETED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vanishing_secrets_deleted_total",
            "Total number of delete requests by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create DELETED_TOTAL metric - this should never happen")
});

static BACKEND_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vanishing_secrets_backend_errors_total",
            "Total number of unexpected backend failures",
        ),
        &["operation", "reason"],
    )
    .expect("Failed to create BACKEND_ERRORS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "vanishing_secrets_operation_duration_seconds",
            "Duration of store operations in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

/// Register store metrics with the registry
pub(crate) fn register_store_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CREATE_CONFLICTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONSUMED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FETCH_NOT_FOUND_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BACKEND_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    Ok(())
}

pub fn increment_created() {
    CREATED_TOTAL.inc();
}

pub fn increment_create_conflicts() {
    CREATE_CONFLICTS_TOTAL.inc();
}

pub fn increment_consumed() {
    CONSUMED_TOTAL.inc();
}

pub fn increment_fetch_not_found(reason: &str) {
    FETCH_NOT_FOUND_TOTAL.with_label_values(&[reason]).inc();
}

pub fn increment_deleted(outcome: DeleteOutcome) {
    DELETED_TOTAL.with_label_values(&[outcome.as_str()]).inc();
}

pub fn increment_backend_errors(operation: Operation, reason: BackendFailureReason) {
    BACKEND_ERRORS_TOTAL
        .with_label_values(&[operation.as_str(), reason.as_str()])
        .inc();
}

pub fn observe_operation_duration(operation: Operation, seconds: f64) {
    OPERATION_DURATION
        .with_label_values(&[operation.as_str()])
        .observe(seconds);
}
