// trendlens-core/src/interfaces/mod.rs
// ============================================================================
// Module: Trendlens Interfaces
// Description: Backend-agnostic interface for external data sources.
// Purpose: Define the source adapter boundary consumed by the aggregator.
// Dependencies: async-trait, serde, serde_json
// ============================================================================

//! ## Overview
//! Source adapters wrap external data providers behind a uniform async fetch
//! interface. Adapters never propagate uncaught failures: every failure is
//! classified and wrapped into [`FetchResult::Failed`] at the adapter
//! boundary, so failure paths are visible in every signature downstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Identifier for an external data source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a source identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Queries and Results
// ============================================================================

/// Query handed to a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuery {
    /// Adapter-specific operation name.
    pub operation: String,
    /// Operation parameters as structured JSON.
    pub params: Value,
}

impl SourceQuery {
    /// Creates a query for an adapter operation.
    #[must_use]
    pub fn new(operation: &str, params: Value) -> Self {
        Self {
            operation: operation.to_string(),
            params,
        }
    }
}

/// Classified fetch failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Transient network failure (connect, DNS, reset).
    Network,
    /// Source signaled rate limiting.
    RateLimit,
    /// Source returned a server-side error.
    ServerError,
    /// Request was rejected by the source (4xx, malformed payload).
    Protocol,
    /// Fetch did not settle before the deadline.
    Timeout,
    /// Adapter connection pool was exhausted.
    Exhausted,
}

impl FetchErrorKind {
    /// Returns a stable label for the failure cause.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::Protocol => "protocol",
            Self::Timeout => "timeout",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single source fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum FetchResult {
    /// Parsed record returned by the source.
    Ok(Value),
    /// Classified fetch failure.
    Failed {
        /// Failing source identifier.
        source: SourceId,
        /// Classified failure cause.
        kind: FetchErrorKind,
        /// Human-readable failure message (never raw provider text).
        message: String,
    },
}

impl FetchResult {
    /// Returns true when the fetch produced a record.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns the fetched record when present.
    #[must_use]
    pub const fn record(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed {
                ..
            } => None,
        }
    }

    /// Creates a classified failure result.
    #[must_use]
    pub fn failed(source: &SourceId, kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            source: source.clone(),
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Source Adapter
// ============================================================================

/// Uniform async interface over an external data provider.
///
/// # Invariants
/// - `fetch` is infallible at the type level: failures are classified into
///   [`FetchResult::Failed`], never surfaced as a Rust error.
/// - Implementations bound their own outbound concurrency and timeouts.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Returns the identifier this adapter is registered under.
    fn source_id(&self) -> &SourceId;

    /// Fetches a record for the query, classifying every failure.
    async fn fetch(&self, query: &SourceQuery) -> FetchResult;
}
