// trendlens-mcp/tests/dispatcher.rs
// ============================================================================
// Module: Dispatcher Tool Tests
// Description: Tool dispatch behavior against stubbed sources.
// Purpose: Verify validation, routing, and envelope synthesis end to end.
// Dependencies: tokio, trendlens-core, trendlens-mcp
// ============================================================================

//! Integration tests for tool dispatch.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp,
    reason = "Test assertions."
)]

mod common;

use serde_json::json;
use trendlens_core::CapabilityError;
use trendlens_core::FetchErrorKind;

use crate::common::StubAdapter;
use crate::common::dispatcher_with;
use crate::common::dispatcher_without_sources;

#[tokio::test]
async fn tool_catalog_lists_every_declared_tool() {
    let dispatcher = dispatcher_without_sources();
    let tools = dispatcher.list_tools();
    let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "search_hackernews",
            "get_github_repo_info",
            "create_sampling_request",
            "analyze_hackernews_trends",
            "code_review_request",
            "analyze_trends",
        ]
    );
    for tool in &tools {
        assert_eq!(tool.input_schema["additionalProperties"], json!(false));
    }
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher.call_tool("mystery_tool", &json!({})).await.unwrap_err();
    assert!(matches!(error, CapabilityError::NotFound(_)));
}

#[tokio::test]
async fn schema_violations_are_collected_exhaustively() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher
        .call_tool("search_hackernews", &json!({ "limit": 50, "page": 2 }))
        .await
        .unwrap_err();
    match error {
        CapabilityError::ValidationFailed(failures) => {
            // Missing query, limit out of range, unknown key.
            assert_eq!(failures.len(), 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn search_tool_returns_source_records() {
    let record = json!({
        "query": "rust",
        "count": 1,
        "stories": [{ "id": 1, "title": "Rust 2.0 speculation", "score": 420 }],
    });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("search", record.clone()),
    ]);
    let result = dispatcher
        .call_tool("search_hackernews", &json!({ "query": "rust" }))
        .await
        .unwrap();
    assert_eq!(result["query"], "rust");
    assert_eq!(result["results"], record);
}

#[tokio::test]
async fn failed_required_source_maps_to_source_unavailable() {
    let dispatcher = dispatcher_with(vec![StubAdapter::new("github").with_failure(
        "repo_info",
        FetchErrorKind::ServerError,
        "upstream 503",
    )]);
    let error = dispatcher
        .call_tool("get_github_repo_info", &json!({ "owner": "rust-lang", "repo": "cargo" }))
        .await
        .unwrap_err();
    match error {
        CapabilityError::SourceUnavailable {
            source_id,
            cause,
        } => {
            assert_eq!(source_id.as_str(), "github");
            assert_eq!(cause, FetchErrorKind::ServerError);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unregistered_source_also_maps_to_source_unavailable() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher
        .call_tool("get_github_repo_info", &json!({ "owner": "rust-lang", "repo": "cargo" }))
        .await
        .unwrap_err();
    assert!(matches!(error, CapabilityError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn sampling_tool_builds_a_ready_envelope_with_defaults() {
    let dispatcher = dispatcher_without_sources();
    let result = dispatcher
        .call_tool(
            "create_sampling_request",
            &json!({
                "prompt": "Analyze AI trends",
                "model_hint": "claude-3-sonnet",
                "intelligence_priority": 0.9,
                "cost_priority": 0.2,
            }),
        )
        .await
        .unwrap();
    assert_eq!(result["status"], "ready_for_client");
    let preferences = &result["sampling_request"]["params"]["modelPreferences"];
    assert_eq!(preferences["hints"][0]["name"], "claude-3-sonnet");
    assert_eq!(preferences["intelligencePriority"], json!(0.9));
    assert_eq!(preferences["costPriority"], json!(0.2));
    assert_eq!(preferences["speedPriority"], json!(0.5));
}

#[tokio::test]
async fn sampling_tool_rejects_string_temperature() {
    let dispatcher = dispatcher_without_sources();
    let error = dispatcher
        .call_tool(
            "create_sampling_request",
            &json!({ "prompt": "hello", "temperature": "0.7" }),
        )
        .await
        .unwrap_err();
    // Tool arguments are schema-typed, not coerced; a string is a violation.
    assert!(matches!(error, CapabilityError::ValidationFailed(_)));
}

#[tokio::test]
async fn trend_analysis_embeds_aggregated_stories() {
    let record = json!({
        "query": "AI",
        "count": 1,
        "stories": [{ "id": 7, "title": "New AI accelerator", "score": 99 }],
    });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("search", record),
    ]);
    let result = dispatcher
        .call_tool(
            "analyze_hackernews_trends",
            &json!({ "topic": "AI", "count": 3, "analysis_type": "brief" }),
        )
        .await
        .unwrap();
    assert_eq!(result["status"], "ready_for_client");
    let text = result["sampling_request"]["params"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("brief"));
    assert!(text.contains("Context data:"));
    assert!(text.contains("New AI accelerator"));
}

#[tokio::test]
async fn multi_source_analysis_tolerates_partial_failure() {
    let record = json!({
        "query": "AI",
        "count": 1,
        "stories": [{ "id": 1, "title": "AI and databases", "score": 50 }],
    });
    let dispatcher = dispatcher_with(vec![
        StubAdapter::new("hackernews").with_record("search", record),
        StubAdapter::new("github").with_failure(
            "search",
            FetchErrorKind::RateLimit,
            "rate limited",
        ),
    ]);
    let result = dispatcher
        .call_tool("analyze_trends", &json!({ "query": "AI", "language": "rust" }))
        .await
        .unwrap();
    assert_eq!(result["status"], "ready_for_client");
    let text = result["sampling_request"]["params"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    // The failed source stays recorded in the embedded context payload.
    assert!(text.contains("rate_limit"));
    assert!(text.contains("AI and databases"));
}
