// trendlens-sources/src/client.rs
// ============================================================================
// Module: Source HTTP Client
// Description: Bounded JSON fetcher shared by the source adapters.
// Purpose: Enforce timeouts, retry policy, and concurrency limits once.
// Dependencies: trendlens-core, reqwest, tokio
// ============================================================================

//! ## Overview
//! Every adapter routes its outbound requests through [`SourceClient`]. The
//! client owns the per-source concurrency semaphore, the request timeout, and
//! the retry policy: transient failures (connect errors, timeouts, 5xx) are
//! retried up to the configured budget, while rate limiting and 4xx rejections
//! settle immediately. Pool exhaustion fails fast instead of queueing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use trendlens_core::FetchErrorKind;
use trendlens_core::SourceId;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration shared by HTTP-backed source adapters.
///
/// # Invariants
/// - `timeout_ms` bounds the full request lifecycle per attempt.
/// - `max_concurrency` is enforced as a hard cap; excess requests fail fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Per-attempt request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry budget for transient failures.
    pub max_retries: u32,
    /// Maximum concurrent in-flight requests.
    pub max_concurrency: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: 10_000,
            max_retries: 2,
            max_concurrency: 8,
            user_agent: "trendlens/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Classified fetch failure raised by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchFailure {
    /// Classified failure cause.
    pub kind: FetchErrorKind,
    /// Human-readable failure message (never raw provider text).
    pub message: String,
}

impl FetchFailure {
    /// Creates a classified failure.
    #[must_use]
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Client construction failures.
#[derive(Debug, Error)]
pub enum SourceClientError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build http client for {source_id}: {reason}")]
    Build {
        /// Source the client was built for.
        source_id: SourceId,
        /// Build failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Bounded JSON fetcher owned by one source adapter.
pub struct SourceClient {
    /// Source the client fetches for, used in failure messages.
    source: SourceId,
    /// Underlying HTTP client with the per-attempt timeout applied.
    client: Client,
    /// Concurrency permits shared across all requests to this source.
    permits: Arc<Semaphore>,
    /// Retry budget for transient failures.
    max_retries: u32,
}

impl SourceClient {
    /// Creates a client for one source from shared HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceClientError::Build`] when the HTTP client cannot be
    /// constructed.
    pub fn new(source: SourceId, config: &HttpSourceConfig) -> Result<Self, SourceClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|error| SourceClientError::Build {
                source_id: source.clone(),
                reason: error.to_string(),
            })?;
        Ok(Self {
            source,
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            max_retries: config.max_retries,
        })
    }

    /// Returns the source this client fetches for.
    #[must_use]
    pub const fn source(&self) -> &SourceId {
        &self.source
    }

    /// Issues a GET request and decodes the JSON body.
    ///
    /// Holds one concurrency permit for the whole attempt sequence. Transient
    /// failures are retried with exponential backoff; rate limiting and
    /// client-side rejections settle immediately.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] with the classified cause of the last attempt.
    pub async fn get_json(&self, url: &str) -> Result<Value, FetchFailure> {
        let Ok(_permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            return Err(FetchFailure::new(
                FetchErrorKind::Exhausted,
                format!("{} connection pool exhausted", self.source),
            ));
        };

        let mut attempt: u32 = 0;
        loop {
            match self.attempt_get(url).await {
                Ok(value) => return Ok(value),
                Err((failure, retryable)) => {
                    if !retryable || attempt >= self.max_retries {
                        return Err(failure);
                    }
                    let backoff = Duration::from_millis(100_u64 << attempt.min(6));
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Issues one request attempt and classifies its outcome.
    async fn attempt_get(&self, url: &str) -> Result<Value, (FetchFailure, bool)> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => return Err(self.classify_transport(&error)),
        };
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err((
                FetchFailure::new(
                    FetchErrorKind::RateLimit,
                    format!("{} signaled rate limiting", self.source),
                ),
                false,
            ));
        }
        if status.is_client_error() {
            return Err((
                FetchFailure::new(
                    FetchErrorKind::Protocol,
                    format!("{} rejected the request with status {}", self.source, status.as_u16()),
                ),
                false,
            ));
        }
        if status.is_server_error() {
            return Err((
                FetchFailure::new(
                    FetchErrorKind::ServerError,
                    format!("{} returned status {}", self.source, status.as_u16()),
                ),
                true,
            ));
        }
        response.json::<Value>().await.map_err(|_| {
            (
                FetchFailure::new(
                    FetchErrorKind::Protocol,
                    format!("{} returned a non-JSON body", self.source),
                ),
                false,
            )
        })
    }

    /// Classifies a transport-level failure and whether it is retryable.
    fn classify_transport(&self, error: &reqwest::Error) -> (FetchFailure, bool) {
        if error.is_timeout() {
            (
                FetchFailure::new(
                    FetchErrorKind::Timeout,
                    format!("request to {} timed out", self.source),
                ),
                true,
            )
        } else if error.is_connect() {
            (
                FetchFailure::new(
                    FetchErrorKind::Network,
                    format!("could not connect to {}", self.source),
                ),
                true,
            )
        } else {
            (
                FetchFailure::new(
                    FetchErrorKind::Network,
                    format!("transport failure talking to {}", self.source),
                ),
                false,
            )
        }
    }
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient")
            .field("source", &self.source)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
