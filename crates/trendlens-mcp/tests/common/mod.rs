// trendlens-mcp/tests/common/mod.rs
// ============================================================================
// Module: Dispatcher Test Support
// Description: Stub source adapters and dispatcher builders for tests.
// Purpose: Drive the dispatcher without real network sources.
// Dependencies: async-trait, trendlens-core, trendlens-sources
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are used unevenly across test binaries.")]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use trendlens_core::FetchErrorKind;
use trendlens_core::FetchResult;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use trendlens_mcp::Dispatcher;
use trendlens_mcp::TrendlensConfig;
use trendlens_sources::SourceRegistry;

/// Source adapter answering from canned per-operation responses.
pub struct StubAdapter {
    /// Stubbed source identifier.
    id: SourceId,
    /// Canned responses keyed by operation name.
    responses: BTreeMap<String, FetchResult>,
}

impl StubAdapter {
    /// Creates a stub with no canned responses.
    pub fn new(source: &str) -> Self {
        Self {
            id: SourceId::new(source),
            responses: BTreeMap::new(),
        }
    }

    /// Cans a successful record for an operation.
    ///
    /// Records should mirror the real adapter shapes: listings are wrapped
    /// in an object, such as `{"count": n, "stories": [..]}`.
    #[must_use]
    pub fn with_record(mut self, operation: &str, record: Value) -> Self {
        self.responses.insert(operation.to_string(), FetchResult::Ok(record));
        self
    }

    /// Cans a classified failure for an operation.
    #[must_use]
    pub fn with_failure(mut self, operation: &str, kind: FetchErrorKind, message: &str) -> Self {
        let failure = FetchResult::failed(&self.id, kind, message);
        self.responses.insert(operation.to_string(), failure);
        self
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    async fn fetch(&self, query: &SourceQuery) -> FetchResult {
        self.responses.get(&query.operation).cloned().unwrap_or_else(|| {
            FetchResult::failed(
                &self.id,
                FetchErrorKind::Protocol,
                format!("unsupported operation: {}", query.operation),
            )
        })
    }
}

/// Builds a dispatcher over the given stub adapters.
pub fn dispatcher_with(adapters: Vec<StubAdapter>) -> Dispatcher {
    let mut registry = SourceRegistry::new();
    for adapter in adapters {
        registry.register(Arc::new(adapter)).expect("unique stub source ids");
    }
    Dispatcher::with_sources(&TrendlensConfig::default(), registry).expect("catalog builds")
}

/// Builds a dispatcher with no registered sources.
pub fn dispatcher_without_sources() -> Dispatcher {
    dispatcher_with(Vec::new())
}
