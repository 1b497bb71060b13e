// trendlens-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Context Aggregator
// Description: Deadline-bounded fan-out over registered source adapters.
// Purpose: Collect multi-source context without letting one source stall all.
// Dependencies: crate::interfaces, serde, tokio
// ============================================================================

//! ## Overview
//! The aggregator fans a batch of source requests out concurrently and
//! collects whatever settles before a single shared deadline. Sources that
//! miss the deadline are recorded as timed-out failures rather than awaited;
//! a slow source degrades only its own entry, never the batch.
//!
//! ## Invariants
//! - Every requested source appears exactly once in the output.
//! - The aggregate never takes longer than the deadline plus scheduling
//!   overhead, regardless of adapter behavior.
//! - `complete` is true only when every required source produced a record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::interfaces::FetchErrorKind;
use crate::interfaces::FetchResult;
use crate::interfaces::SourceAdapter;
use crate::interfaces::SourceId;
use crate::interfaces::SourceQuery;

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Single source fetch within an aggregation batch.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    /// Source to fetch from.
    pub source: SourceId,
    /// Query handed to the adapter.
    pub query: SourceQuery,
    /// Whether the batch is incomplete without this source.
    pub required: bool,
}

impl SourceRequest {
    /// Creates a required fetch for a source.
    #[must_use]
    pub fn required(source: SourceId, query: SourceQuery) -> Self {
        Self {
            source,
            query,
            required: true,
        }
    }

    /// Creates an optional fetch for a source.
    #[must_use]
    pub fn optional(source: SourceId, query: SourceQuery) -> Self {
        Self {
            source,
            query,
            required: false,
        }
    }
}

/// Outcome of one aggregation batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedContext {
    /// Per-source fetch outcomes, keyed by source identifier.
    pub results: BTreeMap<SourceId, FetchResult>,
    /// True when every required source produced a record.
    pub complete: bool,
}

// ============================================================================
// SECTION: Aggregator
// ============================================================================

/// Deadline-bounded concurrent fetcher over registered adapters.
pub struct ContextAggregator {
    /// Registered adapters keyed by source identifier.
    adapters: BTreeMap<SourceId, Arc<dyn SourceAdapter>>,
    /// Shared deadline for one aggregation batch.
    deadline: Duration,
}

impl ContextAggregator {
    /// Creates an aggregator with the given batch deadline.
    #[must_use]
    pub const fn new(deadline: Duration) -> Self {
        Self {
            adapters: BTreeMap::new(),
            deadline,
        }
    }

    /// Registers an adapter under its own source identifier.
    ///
    /// A later registration for the same identifier replaces the earlier one.
    pub fn register_adapter(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source_id().clone(), adapter);
    }

    /// Returns the configured batch deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Fetches all requested sources concurrently under the shared deadline.
    ///
    /// Requests naming an unregistered source settle immediately as protocol
    /// failures. Sources still pending at the deadline are aborted and
    /// recorded as timed out.
    pub async fn aggregate(&self, requests: &[SourceRequest]) -> AggregatedContext {
        let mut results: BTreeMap<SourceId, FetchResult> = BTreeMap::new();
        let mut tasks: JoinSet<(SourceId, FetchResult)> = JoinSet::new();

        for request in requests {
            match self.adapters.get(&request.source) {
                Some(adapter) => {
                    let adapter = Arc::clone(adapter);
                    let source = request.source.clone();
                    let query = request.query.clone();
                    tasks.spawn(async move {
                        let result = adapter.fetch(&query).await;
                        (source, result)
                    });
                }
                None => {
                    results.insert(
                        request.source.clone(),
                        FetchResult::failed(
                            &request.source,
                            FetchErrorKind::Protocol,
                            "source not registered",
                        ),
                    );
                }
            }
        }

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        while !tasks.is_empty() {
            tokio::select! {
                biased;
                () = &mut deadline => {
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next() => {
                    match joined {
                        Some(Ok((source, result))) => {
                            results.insert(source, result);
                        }
                        Some(Err(_)) | None => {}
                    }
                }
            }
        }

        for request in requests {
            results.entry(request.source.clone()).or_insert_with(|| {
                FetchResult::failed(
                    &request.source,
                    FetchErrorKind::Timeout,
                    "source did not respond before the aggregation deadline",
                )
            });
        }

        let complete = requests
            .iter()
            .filter(|request| request.required)
            .all(|request| results.get(&request.source).is_some_and(FetchResult::is_ok));

        AggregatedContext {
            results,
            complete,
        }
    }
}

impl std::fmt::Debug for ContextAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAggregator")
            .field("sources", &self.adapters.keys().collect::<Vec<_>>())
            .field("deadline", &self.deadline)
            .finish()
    }
}
