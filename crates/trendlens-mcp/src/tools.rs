// trendlens-mcp/src/tools.rs
// ============================================================================
// Module: Tool Handlers
// Description: Handler bodies for every registered tool.
// Purpose: Execute schema-validated tool calls against sources and synthesis.
// Dependencies: crate::{analysis, dispatch}, trendlens-core, serde_json
// ============================================================================

//! ## Overview
//! Tool handlers run after schema validation, so argument extraction here
//! assumes declared types. Handlers either return source data directly or
//! hand aggregated context to the analysis synthesizer and return its
//! envelope. Data-requiring handlers treat a failed required source as
//! `SourceUnavailable`; the multi-source handler tolerates partial failure
//! and records it in the context payload instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use trendlens_core::CapabilityError;
use trendlens_core::FetchResult;
use trendlens_core::Priorities;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use trendlens_core::SourceRequest;
use trendlens_sources::GITHUB_SOURCE_ID;
use trendlens_sources::HACKERNEWS_SOURCE_ID;

use crate::analysis;
use crate::analysis::AnalysisDepth;
use crate::analysis::DirectRequest;
use crate::analysis::ReviewFocus;
use crate::dispatch::Dispatcher;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default match budget for story search.
const DEFAULT_SEARCH_LIMIT: usize = 5;
/// Default story budget for trend analysis.
const DEFAULT_ANALYSIS_COUNT: usize = 5;
/// Default topic when trend analysis is called without one.
const DEFAULT_TOPIC: &str = "AI";
/// Default repository language for multi-source analysis.
const DEFAULT_LANGUAGE: &str = "python";
/// Default per-source record budget for multi-source analysis.
const DEFAULT_MULTI_COUNT: usize = 3;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Executes a schema-validated tool call.
///
/// # Errors
///
/// Returns [`CapabilityError`] from the individual handler.
pub(crate) async fn call(
    dispatcher: &Dispatcher,
    name: &str,
    args: &Value,
) -> Result<Value, CapabilityError> {
    match name {
        "search_hackernews" => search_hackernews(dispatcher, args).await,
        "get_github_repo_info" => repo_info(dispatcher, args).await,
        "create_sampling_request" => create_sampling_request(dispatcher, args),
        "analyze_hackernews_trends" => analyze_hackernews_trends(dispatcher, args).await,
        "code_review_request" => code_review_request(dispatcher, args).await,
        "analyze_trends" => analyze_trends(dispatcher, args).await,
        other => Err(CapabilityError::NotFound(format!("tool: {other}"))),
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Searches current top stories by title.
async fn search_hackernews(
    dispatcher: &Dispatcher,
    args: &Value,
) -> Result<Value, CapabilityError> {
    let query = str_arg(args, "query").unwrap_or_default();
    let limit = count_arg(args, "limit", DEFAULT_SEARCH_LIMIT);
    let stories = dispatcher
        .fetch_required(
            HACKERNEWS_SOURCE_ID,
            "search",
            json!({ "query": query, "limit": limit }),
        )
        .await?;
    Ok(json!({ "query": query, "results": stories }))
}

/// Fetches normalized metadata for one repository.
async fn repo_info(dispatcher: &Dispatcher, args: &Value) -> Result<Value, CapabilityError> {
    let owner = str_arg(args, "owner").unwrap_or_default();
    let repo = str_arg(args, "repo").unwrap_or_default();
    dispatcher
        .fetch_required(GITHUB_SOURCE_ID, "repo_info", json!({ "owner": owner, "repo": repo }))
        .await
}

/// Builds a sampling envelope directly from caller inputs.
fn create_sampling_request(dispatcher: &Dispatcher, args: &Value) -> Result<Value, CapabilityError> {
    let request = DirectRequest {
        prompt: str_arg(args, "prompt").unwrap_or_default().to_string(),
        context_data: args.get("context_data").cloned(),
        max_tokens: num_arg(args, "max_tokens").map(to_u32),
        temperature: num_arg(args, "temperature"),
        model_hint: str_arg(args, "model_hint").map(ToString::to_string),
        priorities: Priorities {
            intelligence: num_arg(args, "intelligence_priority"),
            cost: num_arg(args, "cost_priority"),
            speed: num_arg(args, "speed_priority"),
        },
    };
    let envelope = analysis::direct_request(request, &dispatcher.sampling)?;
    to_value(&envelope)
}

/// Aggregates stories and synthesizes a trend-analysis envelope.
async fn analyze_hackernews_trends(
    dispatcher: &Dispatcher,
    args: &Value,
) -> Result<Value, CapabilityError> {
    let topic = str_arg(args, "topic").unwrap_or(DEFAULT_TOPIC).to_string();
    let count = count_arg(args, "count", DEFAULT_ANALYSIS_COUNT);
    let depth = str_arg(args, "analysis_type")
        .and_then(AnalysisDepth::parse)
        .unwrap_or_default();
    let id = SourceId::new(HACKERNEWS_SOURCE_ID);
    let request = SourceRequest::required(
        id.clone(),
        SourceQuery {
            operation: "search".to_string(),
            params: json!({ "query": topic, "limit": count }),
        },
    );
    let context = dispatcher.aggregator.aggregate(&[request]).await;
    if !context.complete {
        return Err(source_failure(&context.results.get(&id).cloned(), id));
    }
    let envelope =
        analysis::trend_analysis(&topic, count, depth, &context, &dispatcher.sampling)?;
    to_value(&envelope)
}

/// Aggregates repository metadata and synthesizes a review envelope.
async fn code_review_request(
    dispatcher: &Dispatcher,
    args: &Value,
) -> Result<Value, CapabilityError> {
    let owner = str_arg(args, "owner").unwrap_or_default().to_string();
    let repo = str_arg(args, "repo").unwrap_or_default().to_string();
    let focus = str_arg(args, "review_focus").and_then(ReviewFocus::parse).unwrap_or_default();
    let id = SourceId::new(GITHUB_SOURCE_ID);
    let request = SourceRequest::required(
        id.clone(),
        SourceQuery {
            operation: "repo_info".to_string(),
            params: json!({ "owner": owner, "repo": repo }),
        },
    );
    let context = dispatcher.aggregator.aggregate(&[request]).await;
    if !context.complete {
        return Err(source_failure(&context.results.get(&id).cloned(), id));
    }
    let envelope = analysis::code_review(&owner, &repo, focus, &context, &dispatcher.sampling)?;
    to_value(&envelope)
}

/// Fans out to both sources and synthesizes a multi-source envelope.
///
/// Both fetches are optional; a failed source stays recorded in the context
/// payload the model is asked to reason over.
async fn analyze_trends(dispatcher: &Dispatcher, args: &Value) -> Result<Value, CapabilityError> {
    let query = str_arg(args, "query").unwrap_or(DEFAULT_TOPIC).to_string();
    let language = str_arg(args, "language").unwrap_or(DEFAULT_LANGUAGE).to_string();
    let story_count = count_arg(args, "story_count", DEFAULT_MULTI_COUNT);
    let repo_count = count_arg(args, "repo_count", DEFAULT_MULTI_COUNT);
    let requests = [
        SourceRequest::optional(
            SourceId::new(HACKERNEWS_SOURCE_ID),
            SourceQuery {
                operation: "search".to_string(),
                params: json!({ "query": query, "limit": story_count }),
            },
        ),
        SourceRequest::optional(
            SourceId::new(GITHUB_SOURCE_ID),
            SourceQuery {
                operation: "search".to_string(),
                params: json!({ "query": format!("{query} language:{language}"), "limit": repo_count }),
            },
        ),
    ];
    let context = dispatcher.aggregator.aggregate(&requests).await;
    let envelope = analysis::multi_source_trends(&query, &language, &context, &dispatcher.sampling)?;
    to_value(&envelope)
}

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Reads an optional string argument.
fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Reads an optional numeric argument.
fn num_arg(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64)
}

/// Reads an optional count argument with a default.
fn count_arg(args: &Value, key: &str, default: usize) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Counts are range-checked by the input schema."
    )]
    {
        num_arg(args, key).map_or(default, |value| value.round() as usize)
    }
}

/// Converts a schema-range-checked number into a token budget.
fn to_u32(value: f64) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Budgets are range-checked by the input schema."
    )]
    {
        value.round() as u32
    }
}

/// Serializes a handler result payload.
fn to_value<T: serde::Serialize>(payload: &T) -> Result<Value, CapabilityError> {
    serde_json::to_value(payload).map_err(|err| CapabilityError::Internal(err.to_string()))
}

/// Maps a settled required-source failure into a capability error.
fn source_failure(result: &Option<FetchResult>, id: SourceId) -> CapabilityError {
    match result {
        Some(FetchResult::Failed {
            source,
            kind,
            ..
        }) => CapabilityError::SourceUnavailable {
            source_id: source.clone(),
            cause: *kind,
        },
        _ => CapabilityError::Internal(format!("source {id} produced no result")),
    }
}
