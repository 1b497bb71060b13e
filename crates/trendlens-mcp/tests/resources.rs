// trendlens-mcp/tests/resources.rs
// ============================================================================
// Module: Resource Read Tests
// Description: Resource routing and handler behavior against stubbed sources.
// Purpose: Verify URI resolution, parameter coercion, and payload shapes.
// Dependencies: tokio, trendlens-core, trendlens-mcp
// ============================================================================

//! Integration tests for resource routing and reads.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test assertions."
)]

mod common;

use serde_json::Value;
use serde_json::json;
use trendlens_core::CapabilityError;
use trendlens_core::FetchErrorKind;

use crate::common::StubAdapter;
use crate::common::dispatcher_with;
use crate::common::dispatcher_without_sources;

#[tokio::test]
async fn resource_catalog_lists_every_template() {
    let dispatcher = dispatcher_without_sources();
    let definitions = dispatcher.list_resources();
    assert_eq!(definitions.len(), 11);
    let names: Vec<&str> =
        definitions.iter().map(|definition| definition.name.as_str()).collect();
    assert!(names.contains(&"server-status"));
    assert!(names.contains(&"synthetic-samples"));
    assert!(names.contains(&"trend-analysis"));
}

#[tokio::test]
async fn roots_resource_lists_served_schemes() {
    let dispatcher = dispatcher_without_sources();
    let result = dispatcher.read_resource("roots://").await.unwrap();
    let schemes: Vec<&str> = result["schemes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        schemes,
        vec!["analysis", "github", "hackernews", "roots", "sampling", "status"]
    );
    assert_eq!(result["template_count"], json!(11));
}

#[tokio::test]
async fn server_status_reports_capability_counts() {
    let dispatcher = dispatcher_without_sources();
    let result = dispatcher.read_resource("status://server").await.unwrap();
    assert_eq!(result["status"], "ok");
    assert_eq!(result["capabilities"]["tools"], json!(6));
    assert_eq!(result["capabilities"]["resources"], json!(11));
    assert_eq!(result["capabilities"]["prompts"], json!(5));
    assert_eq!(result["aggregation_deadline_ms"], json!(5_000));
}

#[tokio::test]
async fn sequential_samples_ramp_from_one() {
    let dispatcher = dispatcher_without_sources();
    let result = dispatcher.read_resource("sampling://sequential/5").await.unwrap();
    assert_eq!(result["sampling_type"], "sequential");
    assert_eq!(result["count"], json!(5));
    assert_eq!(result["samples"], json!([1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn top_stories_pass_the_validated_limit_through() {
    let stories = json!([{ "id": 1, "title": "Show HN: trendlens" }]);
    let record = json!({ "count": 1, "stories": stories });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("top_stories", record),
    ]);
    let result = dispatcher.read_resource("hackernews://top/5").await.unwrap();
    assert_eq!(result["limit"], json!(5));
    assert_eq!(result["stories"], stories);
}

#[tokio::test]
async fn out_of_range_limit_is_a_validation_failure() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher.read_resource("hackernews://top/99").await.unwrap_err();
    match error {
        CapabilityError::ValidationFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].field, "limit");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn repository_samples_are_bounded_by_count() {
    let record = json!({
        "query": "language:python",
        "count": 5,
        "repositories": [
            { "name": "alpha" },
            { "name": "beta" },
            { "name": "gamma" },
            { "name": "delta" },
            { "name": "epsilon" },
        ],
    });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("github").with_record("search", record),
    ]);
    let result =
        dispatcher.read_resource("sampling://repositories/python/3").await.unwrap();
    assert_eq!(result["language"], "python");
    assert_eq!(result["count"], json!(3));
    assert_eq!(result["samples"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn story_samples_are_drawn_from_the_record_listing() {
    // Adapters wrap their listings, so the handler must sample the nested
    // `stories` array rather than the record object itself.
    let record = json!({ "count": 2, "stories": [{ "id": 1 }, { "id": 2 }] });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("top_stories", record),
    ]);
    let result = dispatcher.read_resource("sampling://hackernews/2").await.unwrap();
    let samples = result["samples"].as_array().unwrap();
    assert_eq!(samples.len(), 2);
    for sample in samples {
        assert!(sample["id"].is_u64());
    }
}

#[tokio::test]
async fn specific_sampling_template_wins_over_the_generic_one() {
    let record = json!({ "count": 2, "stories": [{ "id": 1 }, { "id": 2 }] });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("top_stories", record),
    ]);
    // `sampling://hackernews/2` overlaps `sampling://{sampling_type}/{count}`;
    // the literal segment must win.
    let result = dispatcher.read_resource("sampling://hackernews/2").await.unwrap();
    assert_eq!(result["count"], json!(2));
    assert_eq!(result["samples"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_source_surfaces_as_source_unavailable() {
    let dispatcher = dispatcher_with(vec![StubAdapter::new("github").with_failure(
        "trending",
        FetchErrorKind::RateLimit,
        "rate limited",
    )]);
    let error =
        dispatcher.read_resource("github://trending/rust/daily").await.unwrap_err();
    assert!(matches!(error, CapabilityError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn unmatched_uri_is_not_found() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher.read_resource("nope://anything").await.unwrap_err();
    assert!(matches!(error, CapabilityError::NotFound(_)));
}

#[tokio::test]
async fn unknown_query_key_is_rejected() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher.read_resource("analysis://trends?page=2").await.unwrap_err();
    match error {
        CapabilityError::ValidationFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].field, "page");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn trend_analysis_binds_declared_query_parameters() {
    let stories =
        json!({ "query": "databases", "count": 1, "stories": [{ "title": "Postgres at scale" }] });
    let repositories = json!({
        "query": "databases language:rust",
        "count": 1,
        "repositories": [{ "name": "pgvector" }],
    });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("search", stories),
        StubAdapter::new("github").with_record("search", repositories),
    ]);
    let result = dispatcher
        .read_resource("analysis://trends?query=databases&language=rust")
        .await
        .unwrap();
    assert_eq!(result["status"], "ready_for_client");
    let text = result["sampling_request"]["params"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("databases"));
    assert!(text.contains("rust"));
    assert!(text.contains("Postgres at scale"));
}

#[tokio::test]
async fn analysis_resource_wraps_a_sampling_envelope() {
    let metadata = json!({ "full_name": "rust-lang/cargo", "stargazers_count": 30000 });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("github").with_record("repo_info", metadata),
    ]);
    let result =
        dispatcher.read_resource("analysis://github/rust-lang/cargo").await.unwrap();
    assert_eq!(result["status"], "ready_for_client");
    assert_eq!(result["sampling_request"]["method"], "sampling/createMessage");
    let text = result["sampling_request"]["params"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("rust-lang/cargo"));
}
