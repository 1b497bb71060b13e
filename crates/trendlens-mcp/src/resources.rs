// trendlens-mcp/src/resources.rs
// ============================================================================
// Module: Resource Handlers
// Description: Handler bodies for every registered resource template.
// Purpose: Produce resource payloads from routed, validated URI parameters.
// Dependencies: crate::{analysis, dispatch, synthetic}, trendlens-core
// ============================================================================

//! ## Overview
//! Resource handlers receive the template name and coerced parameters the
//! router extracted. Status resources answer from the catalog alone,
//! sampling resources combine source data with local generation, and
//! analysis resources return the same envelopes the analysis tools produce.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use serde_json::Value;
use serde_json::json;
use trendlens_core::AggregatedContext;
use trendlens_core::CapabilityError;
use trendlens_core::FetchResult;
use trendlens_core::PROTOCOL_VERSION;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use trendlens_core::SourceRequest;
use trendlens_core::ValidatedArgs;
use trendlens_sources::GITHUB_SOURCE_ID;
use trendlens_sources::HACKERNEWS_SOURCE_ID;

use crate::analysis;
use crate::analysis::AnalysisDepth;
use crate::analysis::ReviewFocus;
use crate::dispatch::Dispatcher;
use crate::synthetic;
use crate::synthetic::SamplingStrategy;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Story pool fetched before random story sampling.
const STORY_POOL_LIMIT: usize = 30;
/// Repository pool fetched before random repository sampling.
const REPOSITORY_POOL_LIMIT: usize = 10;
/// Default topic for query-parameter driven trend analysis.
const DEFAULT_TOPIC: &str = "AI";
/// Default language for query-parameter driven trend analysis.
const DEFAULT_LANGUAGE: &str = "python";
/// Record budget per source for query-parameter driven trend analysis.
const TREND_RECORD_LIMIT: usize = 3;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Executes a routed resource read.
///
/// # Errors
///
/// Returns [`CapabilityError`] from the individual handler.
pub(crate) async fn read(
    dispatcher: &Dispatcher,
    template: &str,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    match template {
        "roots" => Ok(roots(dispatcher)),
        "server-status" => Ok(server_status(dispatcher)),
        "resource-index" => resource_index(dispatcher),
        "hackernews-top" => hackernews_top(dispatcher, params).await,
        "github-trending" => github_trending(dispatcher, params).await,
        "synthetic-samples" => synthetic_samples(params),
        "hackernews-samples" => hackernews_samples(dispatcher, params).await,
        "repository-samples" => repository_samples(dispatcher, params).await,
        "hackernews-analysis" => hackernews_analysis(dispatcher, params).await,
        "github-analysis" => github_analysis(dispatcher, params).await,
        "trend-analysis" => trend_analysis(dispatcher, params).await,
        other => Err(CapabilityError::NotFound(format!("resource template: {other}"))),
    }
}

// ============================================================================
// SECTION: Status Handlers
// ============================================================================

/// Catalog of URI schemes served by this server.
fn roots(dispatcher: &Dispatcher) -> Value {
    let definitions = dispatcher.list_resources();
    let schemes: BTreeSet<&str> = definitions
        .iter()
        .filter_map(|definition| definition.uri_template.split_once("://"))
        .map(|(scheme, _)| scheme)
        .collect();
    json!({
        "schemes": schemes,
        "template_count": definitions.len(),
    })
}

/// Server status and capability summary.
fn server_status(dispatcher: &Dispatcher) -> Value {
    json!({
        "status": "ok",
        "protocol_version": PROTOCOL_VERSION,
        "capabilities": {
            "tools": dispatcher.list_tools().len(),
            "resources": dispatcher.list_resources().len(),
            "prompts": dispatcher.list_prompts().len(),
        },
        "aggregation_deadline_ms": dispatcher.aggregator.deadline().as_millis(),
    })
}

/// Registered resource template catalog.
fn resource_index(dispatcher: &Dispatcher) -> Result<Value, CapabilityError> {
    serde_json::to_value(dispatcher.list_resources())
        .map_err(|err| CapabilityError::Internal(err.to_string()))
}

// ============================================================================
// SECTION: Source Handlers
// ============================================================================

/// Current top stories, bounded by the validated limit.
async fn hackernews_top(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let limit = count_param(params, "limit", STORY_POOL_LIMIT);
    let record = dispatcher
        .fetch_required(HACKERNEWS_SOURCE_ID, "top_stories", json!({ "limit": limit }))
        .await?;
    Ok(json!({ "limit": limit, "stories": record_array(&record, "stories") }))
}

/// Most-starred repositories created inside a rolling window.
async fn github_trending(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let language = str_param(params, "language").unwrap_or_default();
    let since = str_param(params, "since").unwrap_or_default();
    let record = dispatcher
        .fetch_required(
            GITHUB_SOURCE_ID,
            "trending",
            json!({ "language": language, "since": since }),
        )
        .await?;
    Ok(json!({
        "language": language,
        "since": since,
        "repositories": record_array(&record, "repositories"),
    }))
}

// ============================================================================
// SECTION: Sampling Handlers
// ============================================================================

/// Locally generated numeric samples.
fn synthetic_samples(params: &ValidatedArgs) -> Result<Value, CapabilityError> {
    let label = str_param(params, "sampling_type").unwrap_or_default();
    let strategy = SamplingStrategy::parse(label).ok_or_else(|| {
        CapabilityError::invalid("sampling_type", format!("unknown strategy: {label}"))
    })?;
    let count = count_param(params, "count", 1);
    Ok(synthetic::generate(strategy, count))
}

/// Random sample of current top stories.
async fn hackernews_samples(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let count = count_param(params, "count", 1);
    let record = dispatcher
        .fetch_required(
            HACKERNEWS_SOURCE_ID,
            "top_stories",
            json!({ "limit": STORY_POOL_LIMIT }),
        )
        .await?;
    let pool = record_array(&record, "stories");
    Ok(json!({
        "count": count,
        "samples": sample_array(&pool, count),
    }))
}

/// Random sample of popular repositories for a language.
async fn repository_samples(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let language = str_param(params, "language").unwrap_or_default();
    let count = count_param(params, "count", 1);
    let record = dispatcher
        .fetch_required(
            GITHUB_SOURCE_ID,
            "search",
            json!({ "query": format!("language:{language}"), "limit": REPOSITORY_POOL_LIMIT }),
        )
        .await?;
    let pool = record_array(&record, "repositories");
    Ok(json!({
        "language": language,
        "count": count,
        "samples": sample_array(&pool, count),
    }))
}

// ============================================================================
// SECTION: Analysis Handlers
// ============================================================================

/// Trend-analysis sampling request served as a resource.
async fn hackernews_analysis(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let topic = str_param(params, "topic").unwrap_or(DEFAULT_TOPIC).to_string();
    let count = count_param(params, "count", TREND_RECORD_LIMIT);
    let stories = dispatcher
        .fetch_required(
            HACKERNEWS_SOURCE_ID,
            "search",
            json!({ "query": topic, "limit": count }),
        )
        .await?;
    let context = single_source_context(HACKERNEWS_SOURCE_ID, stories);
    let envelope = analysis::trend_analysis(
        &topic,
        count,
        AnalysisDepth::default(),
        &context,
        &dispatcher.sampling,
    )?;
    serde_json::to_value(envelope).map_err(|err| CapabilityError::Internal(err.to_string()))
}

/// Code-review sampling request served as a resource.
async fn github_analysis(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let owner = str_param(params, "owner").unwrap_or_default().to_string();
    let repo = str_param(params, "repo").unwrap_or_default().to_string();
    let metadata = dispatcher
        .fetch_required(GITHUB_SOURCE_ID, "repo_info", json!({ "owner": owner, "repo": repo }))
        .await?;
    let context = single_source_context(GITHUB_SOURCE_ID, metadata);
    let envelope = analysis::code_review(
        &owner,
        &repo,
        ReviewFocus::default(),
        &context,
        &dispatcher.sampling,
    )?;
    serde_json::to_value(envelope).map_err(|err| CapabilityError::Internal(err.to_string()))
}

/// Multi-source trend analysis driven by declared query parameters.
async fn trend_analysis(
    dispatcher: &Dispatcher,
    params: &ValidatedArgs,
) -> Result<Value, CapabilityError> {
    let query = str_param(params, "query").unwrap_or(DEFAULT_TOPIC).to_string();
    let language = str_param(params, "language").unwrap_or(DEFAULT_LANGUAGE).to_string();
    let requests = [
        SourceRequest::optional(
            SourceId::new(HACKERNEWS_SOURCE_ID),
            SourceQuery::new("search", json!({ "query": query, "limit": TREND_RECORD_LIMIT })),
        ),
        SourceRequest::optional(
            SourceId::new(GITHUB_SOURCE_ID),
            SourceQuery::new(
                "search",
                json!({
                    "query": format!("{query} language:{language}"),
                    "limit": TREND_RECORD_LIMIT,
                }),
            ),
        ),
    ];
    let context = dispatcher.aggregator.aggregate(&requests).await;
    let envelope =
        analysis::multi_source_trends(&query, &language, &context, &dispatcher.sampling)?;
    serde_json::to_value(envelope).map_err(|err| CapabilityError::Internal(err.to_string()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an optional string parameter.
fn str_param<'a>(params: &'a ValidatedArgs, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Reads an optional count parameter with a default.
fn count_param(params: &ValidatedArgs, key: &str, default: usize) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Counts are range-checked during parameter validation."
    )]
    {
        params
            .get(key)
            .and_then(Value::as_f64)
            .map_or(default, |value| value.round() as usize)
    }
}

/// Extracts a named listing array from an adapter record.
///
/// Adapter records wrap their listings in an object, such as
/// `{"count": n, "stories": [..]}`. A missing or non-array field yields an
/// empty pool.
fn record_array(record: &Value, key: &str) -> Vec<Value> {
    record.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
}

/// Randomly samples up to `count` elements from a listing pool.
fn sample_array(pool: &[Value], count: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    pool.choose_multiple(&mut rng, count).cloned().collect()
}

/// Wraps a single successful fetch into aggregated context.
fn single_source_context(source: &str, record: Value) -> AggregatedContext {
    let mut results = BTreeMap::new();
    results.insert(SourceId::new(source), FetchResult::Ok(record));
    AggregatedContext {
        results,
        complete: true,
    }
}
