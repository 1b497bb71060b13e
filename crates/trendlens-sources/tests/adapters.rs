// crates/trendlens-sources/tests/adapters.rs
// ============================================================================
// Module: Source Adapter Tests
// Description: Adapter behavior tests against a local HTTP server.
// Purpose: Verify normalization, retry policy, and failure classification.
// Dependencies: trendlens-core, trendlens-sources, tiny_http
// ============================================================================

//! Integration tests for the built-in source adapters.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use trendlens_core::FetchErrorKind;
use trendlens_core::FetchResult;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceQuery;
use trendlens_sources::GitHubAdapter;
use trendlens_sources::HackerNewsAdapter;
use trendlens_sources::HttpSourceConfig;
use trendlens_sources::SourceRegistry;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Serves canned JSON responses for a fixed number of requests.
///
/// Each entry is a URL-prefix route. Unmatched requests get a 404.
fn spawn_json_server(
    routes: Vec<(String, Value)>,
    request_budget: usize,
) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("local server binds");
    let base = format!("http://{}", server.server_addr().to_ip().expect("tcp listen address"));
    let handle = thread::spawn(move || {
        for request in server.incoming_requests().take(request_budget) {
            let url = request.url().to_string();
            let matched = routes.iter().find(|(prefix, _)| url.starts_with(prefix.as_str()));
            let response = match matched {
                Some((_, body)) => json_response(body, 200),
                None => json_response(&json!({ "error": "not found" }), 404),
            };
            let _ = request.respond(response);
        }
    });
    (base, handle)
}

fn json_response(body: &Value, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    let header =
        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("valid header");
    Response::from_data(body.to_string().into_bytes()).with_header(header).with_status_code(status)
}

fn config_for(base_url: &str) -> HttpSourceConfig {
    HttpSourceConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        max_retries: 1,
        max_concurrency: 4,
        ..HttpSourceConfig::default()
    }
}

fn expect_failure(result: FetchResult) -> (FetchErrorKind, String) {
    match result {
        FetchResult::Failed {
            kind,
            message,
            ..
        } => (kind, message),
        FetchResult::Ok(value) => panic!("expected a failure, got {value}"),
    }
}

// ============================================================================
// SECTION: Hacker News
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hackernews_top_stories_are_normalized() {
    let (base, handle) = spawn_json_server(
        vec![
            ("/topstories.json".to_string(), json!([101, 102, 103])),
            (
                "/item/101.json".to_string(),
                json!({ "title": "Rust 2.0 released", "score": 420, "by": "alice",
                        "descendants": 88, "url": "https://example.com/rust" }),
            ),
            ("/item/102.json".to_string(), json!({ "title": "Show HN: Trendlens", "score": 5 })),
        ],
        3,
    );

    let adapter = HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("top_stories", json!({ "limit": 2 })))
        .await;

    let record = result.record().expect("fetch succeeds");
    assert_eq!(record["count"], 2);
    assert_eq!(record["stories"][0]["title"], "Rust 2.0 released");
    assert_eq!(record["stories"][0]["comments"], 88);
    assert_eq!(record["stories"][1]["by"], "unknown");
    handle.join().expect("server thread exits");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hackernews_search_filters_by_title() {
    let (base, handle) = spawn_json_server(
        vec![
            ("/topstories.json".to_string(), json!([1, 2])),
            ("/item/1.json".to_string(), json!({ "title": "Async Rust in production" })),
            ("/item/2.json".to_string(), json!({ "title": "Go generics revisited" })),
        ],
        3,
    );

    let adapter = HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("search", json!({ "query": "rust" })))
        .await;

    let record = result.record().expect("fetch succeeds");
    assert_eq!(record["count"], 1);
    assert_eq!(record["stories"][0]["title"], "Async Rust in production");
    handle.join().expect("server thread exits");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unsupported_operation_is_a_protocol_failure() {
    let (base, _handle) = spawn_json_server(Vec::new(), 0);

    let adapter = HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter.fetch(&SourceQuery::new("delete_everything", json!({}))).await;

    let (kind, message) = expect_failure(result);
    assert_eq!(kind, FetchErrorKind::Protocol);
    assert!(message.contains("unsupported operation"));
}

// ============================================================================
// SECTION: GitHub
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn github_trending_builds_a_search_query() {
    let (base, handle) = spawn_json_server(
        vec![(
            "/search/repositories".to_string(),
            json!({ "items": [{ "full_name": "tokio-rs/tokio", "stargazers_count": 25_000,
                                "language": "Rust", "html_url": "https://example.com/tokio" }] }),
        )],
        1,
    );

    let adapter = GitHubAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new(
            "trending",
            json!({ "language": "rust", "since": "weekly", "limit": 5 }),
        ))
        .await;

    let record = result.record().expect("fetch succeeds");
    assert_eq!(record["language"], "rust");
    assert_eq!(record["count"], 1);
    assert_eq!(record["repositories"][0]["full_name"], "tokio-rs/tokio");
    assert_eq!(record["repositories"][0]["stars"], 25_000);
    handle.join().expect("server thread exits");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn github_rejects_unknown_trending_window() {
    let (base, _handle) = spawn_json_server(Vec::new(), 0);

    let adapter = GitHubAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("trending", json!({ "language": "rust", "since": "yearly" })))
        .await;

    let (kind, message) = expect_failure(result);
    assert_eq!(kind, FetchErrorKind::Protocol);
    assert!(message.contains("unsupported window"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_repository_is_a_protocol_failure() {
    let (base, handle) = spawn_json_server(Vec::new(), 1);

    let adapter = GitHubAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("repo_info", json!({ "owner": "nobody", "repo": "nothing" })))
        .await;

    let (kind, _) = expect_failure(result);
    assert_eq!(kind, FetchErrorKind::Protocol);
    handle.join().expect("server thread exits");
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_errors_are_retried_then_succeed() {
    let server = Server::http("127.0.0.1:0").expect("local server binds");
    let base = format!("http://{}", server.server_addr().to_ip().expect("tcp listen address"));
    let handle = thread::spawn(move || {
        let mut served = 0;
        for request in server.incoming_requests().take(2) {
            let status = if served == 0 { 500 } else { 200 };
            served += 1;
            let _ = request.respond(json_response(
                &json!({ "full_name": "rust-lang/rust", "stargazers_count": 1 }),
                status,
            ));
        }
    });

    let adapter = GitHubAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("repo_info", json!({ "owner": "rust-lang", "repo": "rust" })))
        .await;

    let record = result.record().expect("retry recovers the fetch");
    assert_eq!(record["full_name"], "rust-lang/rust");
    handle.join().expect("server thread exits");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rate_limiting_settles_immediately() {
    let server = Server::http("127.0.0.1:0").expect("local server binds");
    let base = format!("http://{}", server.server_addr().to_ip().expect("tcp listen address"));
    let handle = thread::spawn(move || {
        // A retry would hit the request budget and fail the join below.
        for request in server.incoming_requests().take(1) {
            let _ = request.respond(json_response(&json!({}), 429));
        }
    });

    let adapter = GitHubAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter
        .fetch(&SourceQuery::new("repo_info", json!({ "owner": "a", "repo": "b" })))
        .await;

    let (kind, _) = expect_failure(result);
    assert_eq!(kind, FetchErrorKind::RateLimit);
    handle.join().expect("server thread exits");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_host_is_a_network_failure() {
    // Bind then drop a listener so the port is closed when the adapter connects.
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener binds");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);

    let adapter = HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds");
    let result = adapter.fetch(&SourceQuery::new("top_stories", json!({}))).await;

    let (kind, _) = expect_failure(result);
    assert_eq!(kind, FetchErrorKind::Network);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exhausted_pool_fails_fast_instead_of_queueing() {
    let server = Server::http("127.0.0.1:0").expect("local server binds");
    let base = format!("http://{}", server.server_addr().to_ip().expect("tcp listen address"));
    let handle = thread::spawn(move || {
        for request in server.incoming_requests().take(1) {
            thread::sleep(Duration::from_millis(300));
            let _ = request.respond(json_response(&json!([]), 200));
        }
    });

    let config = HttpSourceConfig {
        max_concurrency: 1,
        max_retries: 0,
        ..config_for(&base)
    };
    let adapter = Arc::new(HackerNewsAdapter::new(&config).expect("adapter builds"));
    let query = SourceQuery::new("top_stories", json!({}));

    let slow = Arc::clone(&adapter);
    let slow_query = query.clone();
    let slow_task = tokio::spawn(async move { slow.fetch(&slow_query).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fast = adapter.fetch(&query).await;

    let (kind, message) = expect_failure(fast);
    assert_eq!(kind, FetchErrorKind::Exhausted);
    assert!(message.contains("pool exhausted"));
    let _ = slow_task.await.expect("in-flight fetch settles");
    handle.join().expect("server thread exits");
}

// ============================================================================
// SECTION: Registry
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn registry_rejects_duplicate_source_ids() {
    let (base, _handle) = spawn_json_server(Vec::new(), 0);

    let mut registry = SourceRegistry::new();
    registry
        .register(Arc::new(HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds")))
        .expect("first registration succeeds");
    let error = registry
        .register(Arc::new(HackerNewsAdapter::new(&config_for(&base)).expect("adapter builds")))
        .expect_err("duplicate id is rejected");
    assert!(error.to_string().contains("hackernews"));
    assert_eq!(registry.len(), 1);
}
