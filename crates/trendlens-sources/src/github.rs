// trendlens-sources/src/github.rs
// ============================================================================
// Module: GitHub Adapter
// Description: Source adapter for the GitHub REST API.
// Purpose: Normalize repository search and lookup behind the adapter boundary.
// Dependencies: trendlens-core, crate::client, time, url
// ============================================================================

//! ## Overview
//! The GitHub adapter supports three operations: `trending` searches for the
//! most-starred repositories created inside a rolling window, `repo_info`
//! fetches one repository by owner and name, and `search` runs a free-text
//! repository search. Repository payloads are normalized before they cross
//! the adapter boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use trendlens_core::FetchErrorKind;
use trendlens_core::FetchResult;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use url::Url;

use crate::client::FetchFailure;
use crate::client::HttpSourceConfig;
use crate::client::SourceClient;
use crate::client::SourceClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Source identifier the adapter registers under.
pub const GITHUB_SOURCE_ID: &str = "github";

/// Default REST API base URL.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default repository count when no limit is given.
const DEFAULT_LIMIT: usize = 10;

/// Hard cap on repositories returned per operation.
const MAX_LIMIT: usize = 30;

// ============================================================================
// SECTION: Operation Parameters
// ============================================================================

/// Parameters for the `trending` operation.
#[derive(Debug, Deserialize)]
struct TrendingParams {
    /// Primary language filter.
    language: String,
    /// Rolling creation window: `daily`, `weekly`, or `monthly`.
    since: String,
    /// Number of repositories to return.
    limit: Option<usize>,
}

/// Parameters for the `repo_info` operation.
#[derive(Debug, Deserialize)]
struct RepoInfoParams {
    /// Repository owner login.
    owner: String,
    /// Repository name.
    repo: String,
}

/// Parameters for the `search` operation.
#[derive(Debug, Deserialize)]
struct RepoSearchParams {
    /// Free-text search query.
    query: String,
    /// Number of repositories to return.
    limit: Option<usize>,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Source adapter for the GitHub REST API.
pub struct GitHubAdapter {
    /// Registered source identifier.
    id: SourceId,
    /// Bounded HTTP client.
    client: SourceClient,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl GitHubAdapter {
    /// Creates an adapter from shared HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceClientError`] when the HTTP client cannot be built.
    pub fn new(config: &HttpSourceConfig) -> Result<Self, SourceClientError> {
        let id = SourceId::new(GITHUB_SOURCE_ID);
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

    /// Runs a repository search and normalizes the item listing.
    async fn search_repositories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Value>, FetchFailure> {
        let mut url = Url::parse(&format!("{}/search/repositories", self.base_url))
            .map_err(|_| FetchFailure::new(FetchErrorKind::Protocol, "invalid api base url"))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "stars")
            .append_pair("order", "desc")
            .append_pair("per_page", &limit.to_string());
        let raw = self.client.get_json(url.as_str()).await?;
        let items = raw.get("items").and_then(Value::as_array).ok_or_else(|| {
            FetchFailure::new(FetchErrorKind::Protocol, "search response missing items")
        })?;
        Ok(items.iter().map(normalize_repository).collect())
    }

    async fn trending(&self, params: TrendingParams) -> Result<Value, FetchFailure> {
        let window = window_days(&params.since)?;
        let cutoff = window_start(window)?;
        let limit = clamp_limit(params.limit);
        let query = format!("language:{} created:>={cutoff}", params.language);
        let repositories = self.search_repositories(&query, limit).await?;
        Ok(json!({
            "language": params.language,
            "since": params.since,
            "count": repositories.len(),
            "repositories": repositories,
        }))
    }

    async fn repo_info(&self, params: RepoInfoParams) -> Result<Value, FetchFailure> {
        let raw = self
            .client
            .get_json(&format!("{}/repos/{}/{}", self.base_url, params.owner, params.repo))
            .await?;
        Ok(normalize_repository(&raw))
    }

    async fn search(&self, params: RepoSearchParams) -> Result<Value, FetchFailure> {
        let limit = clamp_limit(params.limit);
        let repositories = self.search_repositories(&params.query, limit).await?;
        Ok(json!({
            "query": params.query,
            "count": repositories.len(),
            "repositories": repositories,
        }))
    }
}

#[async_trait]
impl SourceAdapter for GitHubAdapter {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    async fn fetch(&self, query: &SourceQuery) -> FetchResult {
        let outcome = match query.operation.as_str() {
            "trending" => match decode_params::<TrendingParams>(&query.params) {
                Ok(params) => self.trending(params).await,
                Err(failure) => Err(failure),
            },
            "repo_info" => match decode_params::<RepoInfoParams>(&query.params) {
                Ok(params) => self.repo_info(params).await,
                Err(failure) => Err(failure),
            },
            "search" => match decode_params::<RepoSearchParams>(&query.params) {
                Ok(params) => self.search(params).await,
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

impl std::fmt::Debug for GitHubAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAdapter").field("base_url", &self.base_url).finish()
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

/// Clamps a requested repository count into `[1, MAX_LIMIT]`.
fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Maps a rolling-window label to its length in days.
fn window_days(since: &str) -> Result<i64, FetchFailure> {
    match since {
        "daily" => Ok(1),
        "weekly" => Ok(7),
        "monthly" => Ok(30),
        other => Err(FetchFailure::new(
            FetchErrorKind::Protocol,
            format!("unsupported window: {other}"),
        )),
    }
}

/// Formats the window start date as `YYYY-MM-DD`.
fn window_start(days: i64) -> Result<String, FetchFailure> {
    let format = format_description!("[year]-[month]-[day]");
    (OffsetDateTime::now_utc() - Duration::days(days))
        .date()
        .format(&format)
        .map_err(|_| FetchFailure::new(FetchErrorKind::Protocol, "failed to format window start"))
}

/// Normalizes a raw repository payload to the stable output shape.
fn normalize_repository(raw: &Value) -> Value {
    json!({
        "full_name": raw.get("full_name").and_then(Value::as_str).unwrap_or("unknown/unknown"),
        "description": raw.get("description").and_then(Value::as_str),
        "language": raw.get("language").and_then(Value::as_str),
        "stars": raw.get("stargazers_count").and_then(Value::as_u64).unwrap_or(0),
        "forks": raw.get("forks_count").and_then(Value::as_u64).unwrap_or(0),
        "open_issues": raw.get("open_issues_count").and_then(Value::as_u64).unwrap_or(0),
        "url": raw.get("html_url").and_then(Value::as_str),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
