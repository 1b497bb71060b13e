// crates/trendlens-core/tests/aggregator.rs
// ============================================================================
// Module: Context Aggregator Tests
// Description: Deadline, degradation, and completeness tests.
// Purpose: Ensure one slow source never stalls the aggregation batch.
// Dependencies: trendlens-core, tokio, serde_json
// ============================================================================

//! Concurrency behavior tests for the context aggregator.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use trendlens_core::ContextAggregator;
use trendlens_core::FetchErrorKind;
use trendlens_core::FetchResult;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use trendlens_core::SourceRequest;

/// Stub adapter that settles with a fixed result after a fixed delay.
struct StubAdapter {
    id: SourceId,
    delay: Duration,
    payload: Result<Value, FetchErrorKind>,
}

impl StubAdapter {
    fn ok(id: &str, delay: Duration, payload: Value) -> Arc<Self> {
        Arc::new(Self {
            id: SourceId::new(id),
            delay,
            payload: Ok(payload),
        })
    }

    fn failing(id: &str, delay: Duration, kind: FetchErrorKind) -> Arc<Self> {
        Arc::new(Self {
            id: SourceId::new(id),
            delay,
            payload: Err(kind),
        })
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    async fn fetch(&self, _query: &SourceQuery) -> FetchResult {
        tokio::time::sleep(self.delay).await;
        match &self.payload {
            Ok(value) => FetchResult::Ok(value.clone()),
            Err(kind) => FetchResult::failed(&self.id, *kind, "stub failure"),
        }
    }
}

fn request(id: &str) -> SourceRequest {
    SourceRequest::required(SourceId::new(id), SourceQuery::new("fetch", json!({})))
}

#[tokio::test(start_paused = true)]
async fn slow_source_degrades_only_its_own_entry() {
    let mut aggregator = ContextAggregator::new(Duration::from_millis(500));
    aggregator.register_adapter(StubAdapter::ok(
        "hackernews",
        Duration::from_millis(10),
        json!({ "stories": 3 }),
    ));
    aggregator.register_adapter(StubAdapter::ok(
        "github",
        Duration::from_secs(30),
        json!({ "repos": 1 }),
    ));

    let context = aggregator
        .aggregate(&[request("hackernews"), request("github")])
        .await;

    let fast = context.results.get(&SourceId::new("hackernews")).expect("entry exists");
    assert_eq!(fast.record(), Some(&json!({ "stories": 3 })));

    let slow = context.results.get(&SourceId::new("github")).expect("entry exists");
    let FetchResult::Failed {
        kind, ..
    } = slow
    else {
        panic!("expected the slow source to time out");
    };
    assert_eq!(*kind, FetchErrorKind::Timeout);
    assert!(!context.complete);
}

#[tokio::test(start_paused = true)]
async fn batch_completes_when_all_required_sources_settle() {
    let mut aggregator = ContextAggregator::new(Duration::from_secs(2));
    aggregator.register_adapter(StubAdapter::ok(
        "hackernews",
        Duration::from_millis(40),
        json!({ "stories": 5 }),
    ));
    aggregator.register_adapter(StubAdapter::ok(
        "github",
        Duration::from_millis(80),
        json!({ "repos": 2 }),
    ));

    let context = aggregator
        .aggregate(&[request("hackernews"), request("github")])
        .await;

    assert!(context.complete);
    assert_eq!(context.results.len(), 2);
    assert!(context.results.values().all(FetchResult::is_ok));
}

#[tokio::test(start_paused = true)]
async fn failed_optional_source_keeps_batch_complete() {
    let mut aggregator = ContextAggregator::new(Duration::from_secs(2));
    aggregator.register_adapter(StubAdapter::ok(
        "hackernews",
        Duration::from_millis(10),
        json!({ "stories": 1 }),
    ));
    aggregator.register_adapter(StubAdapter::failing(
        "github",
        Duration::from_millis(10),
        FetchErrorKind::ServerError,
    ));

    let context = aggregator
        .aggregate(&[
            request("hackernews"),
            SourceRequest::optional(SourceId::new("github"), SourceQuery::new("fetch", json!({}))),
        ])
        .await;

    assert!(context.complete);
    let failed = context.results.get(&SourceId::new("github")).expect("entry exists");
    assert!(!failed.is_ok());
}

#[tokio::test(start_paused = true)]
async fn unregistered_source_settles_as_protocol_failure() {
    let aggregator = ContextAggregator::new(Duration::from_secs(1));

    let context = aggregator.aggregate(&[request("nonexistent")]).await;

    let entry = context.results.get(&SourceId::new("nonexistent")).expect("entry exists");
    let FetchResult::Failed {
        kind,
        message,
        ..
    } = entry
    else {
        panic!("expected a protocol failure");
    };
    assert_eq!(*kind, FetchErrorKind::Protocol);
    assert_eq!(message, "source not registered");
    assert!(!context.complete);
}

#[tokio::test(start_paused = true)]
async fn empty_batch_is_trivially_complete() {
    let aggregator = ContextAggregator::new(Duration::from_secs(1));

    let context = aggregator.aggregate(&[]).await;

    assert!(context.results.is_empty());
    assert!(context.complete);
}
