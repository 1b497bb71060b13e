// trendlens-sources/src/hackernews.rs
// ============================================================================
// Module: Hacker News Adapter
// Description: Source adapter for the Hacker News Firebase API.
// Purpose: Normalize story listings and lookups behind the adapter boundary.
// Dependencies: trendlens-core, crate::client, serde_json
// ============================================================================

//! ## Overview
//! The Hacker News adapter supports three operations: `top_stories` returns
//! the current front page, `search` scans the front page for a title match,
//! and `item` fetches one story by identifier. Stories are normalized to a
//! stable shape before they cross the adapter boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use trendlens_core::FetchErrorKind;
use trendlens_core::FetchResult;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;

use crate::client::FetchFailure;
use crate::client::HttpSourceConfig;
use crate::client::SourceClient;
use crate::client::SourceClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Source identifier the adapter registers under.
pub const HACKERNEWS_SOURCE_ID: &str = "hackernews";

/// Default Firebase API base URL.
const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default story count when no limit is given.
const DEFAULT_LIMIT: usize = 10;

/// Hard cap on stories fetched per operation.
const MAX_LIMIT: usize = 50;

/// Front-page window scanned by the search operation.
const SEARCH_WINDOW: usize = 30;

// ============================================================================
// SECTION: Operation Parameters
// ============================================================================

/// Parameters for the `top_stories` operation.
#[derive(Debug, Deserialize)]
struct TopStoriesParams {
    /// Number of stories to return.
    limit: Option<usize>,
}

/// Parameters for the `search` operation.
#[derive(Debug, Deserialize)]
struct SearchParams {
    /// Case-insensitive title match.
    query: String,
    /// Number of matches to return.
    limit: Option<usize>,
}

/// Parameters for the `item` operation.
#[derive(Debug, Deserialize)]
struct ItemParams {
    /// Story identifier.
    id: u64,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Source adapter for the Hacker News Firebase API.
pub struct HackerNewsAdapter {
    /// Registered source identifier.
    id: SourceId,
    /// Bounded HTTP client.
    client: SourceClient,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl HackerNewsAdapter {
    /// Creates an adapter from shared HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceClientError`] when the HTTP client cannot be built.
    pub fn new(config: &HttpSourceConfig) -> Result<Self, SourceClientError> {
        let id = SourceId::new(HACKERNEWS_SOURCE_ID);
        let client = SourceClient::new(id.clone(), config)?;
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url.trim_end_matches('/').to_string()
        };
        Ok(Self {
            id,
            client,
            base_url,
        })
    }

    /// Fetches front-page story identifiers.
    async fn story_ids(&self, count: usize) -> Result<Vec<u64>, FetchFailure> {
        let raw = self.client.get_json(&format!("{}/topstories.json", self.base_url)).await?;
        let ids = raw.as_array().ok_or_else(|| {
            FetchFailure::new(FetchErrorKind::Protocol, "story listing was not an array")
        })?;
        Ok(ids.iter().filter_map(Value::as_u64).take(count).collect())
    }

    /// Fetches and normalizes one story.
    async fn story(&self, id: u64) -> Result<Value, FetchFailure> {
        let raw = self.client.get_json(&format!("{}/item/{id}.json", self.base_url)).await?;
        Ok(normalize_story(id, &raw))
    }

    /// Fetches the front page up to `count` normalized stories.
    ///
    /// Stories that fail to load individually are skipped rather than failing
    /// the whole listing.
    async fn front_page(&self, count: usize) -> Result<Vec<Value>, FetchFailure> {
        let ids = self.story_ids(count).await?;
        let mut stories = Vec::with_capacity(ids.len());
        for id in ids {
            if let Ok(story) = self.story(id).await {
                stories.push(story);
            }
        }
        Ok(stories)
    }

    async fn top_stories(&self, params: TopStoriesParams) -> Result<Value, FetchFailure> {
        let limit = clamp_limit(params.limit);
        let stories = self.front_page(limit).await?;
        Ok(json!({ "count": stories.len(), "stories": stories }))
    }

    async fn search(&self, params: SearchParams) -> Result<Value, FetchFailure> {
        let limit = clamp_limit(params.limit);
        let needle = params.query.to_lowercase();
        let matches: Vec<Value> = self
            .front_page(SEARCH_WINDOW)
            .await?
            .into_iter()
            .filter(|story| {
                story
                    .get("title")
                    .and_then(Value::as_str)
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect();
        Ok(json!({ "query": params.query, "count": matches.len(), "stories": matches }))
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    async fn fetch(&self, query: &SourceQuery) -> FetchResult {
        let outcome = match query.operation.as_str() {
            "top_stories" => match decode_params::<TopStoriesParams>(&query.params) {
                Ok(params) => self.top_stories(params).await,
                Err(failure) => Err(failure),
            },
            "search" => match decode_params::<SearchParams>(&query.params) {
                Ok(params) => self.search(params).await,
                Err(failure) => Err(failure),
            },
            "item" => match decode_params::<ItemParams>(&query.params) {
                Ok(params) => self.story(params.id).await,
                Err(failure) => Err(failure),
            },
            other => Err(FetchFailure::new(
                FetchErrorKind::Protocol,
                format!("unsupported operation: {other}"),
            )),
        };
        match outcome {
            Ok(value) => FetchResult::Ok(value),
            Err(failure) => FetchResult::failed(&self.id, failure.kind, failure.message),
        }
    }
}

impl std::fmt::Debug for HackerNewsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HackerNewsAdapter").field("base_url", &self.base_url).finish()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes operation parameters, classifying malformed input.
fn decode_params<T: serde::de::DeserializeOwned>(params: &Value) -> Result<T, FetchFailure> {
    serde_json::from_value(params.clone()).map_err(|error| {
        FetchFailure::new(FetchErrorKind::Protocol, format!("invalid parameters: {error}"))
    })
}

/// Clamps a requested story count into `[1, MAX_LIMIT]`.
fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Normalizes a raw story payload to the stable output shape.
fn normalize_story(id: u64, raw: &Value) -> Value {
    json!({
        "id": id,
        "title": raw.get("title").and_then(Value::as_str).unwrap_or("(untitled)"),
        "url": raw.get("url").and_then(Value::as_str),
        "score": raw.get("score").and_then(Value::as_u64).unwrap_or(0),
        "by": raw.get("by").and_then(Value::as_str).unwrap_or("unknown"),
        "comments": raw.get("descendants").and_then(Value::as_u64).unwrap_or(0),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn limits_are_clamped_into_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(25)), 25);
    }

    #[test]
    fn stories_normalize_with_defaults_for_missing_fields() {
        let story = normalize_story(42, &json!({ "title": "Rust 2.0", "score": 420 }));
        assert_eq!(story["id"], 42);
        assert_eq!(story["title"], "Rust 2.0");
        assert_eq!(story["score"], 420);
        assert_eq!(story["by"], "unknown");
        assert_eq!(story["url"], Value::Null);
        assert_eq!(story["comments"], 0);
    }
}
