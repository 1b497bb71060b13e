// trendlens-sources/src/registry.rs
// ============================================================================
// Module: Source Registry
// Description: Registry for built-in source adapters.
// Purpose: Own the adapter set and hand it to the context aggregator.
// Dependencies: trendlens-core, thiserror
// ============================================================================

//! ## Overview
//! The source registry collects adapters at startup, rejects duplicate
//! identifiers, and converts into a configured [`ContextAggregator`]. It is
//! the single place adapter wiring happens; request handling only sees the
//! aggregator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use trendlens_core::ContextAggregator;
use trendlens_core::SourceAdapter;
use trendlens_core::SourceId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration failures raised while wiring adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRegistryError {
    /// An adapter with this identifier is already registered.
    #[error("duplicate source adapter: {id}")]
    DuplicateSource {
        /// Conflicting source identifier.
        id: SourceId,
    },
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Adapter set assembled at startup.
#[derive(Default)]
pub struct SourceRegistry {
    /// Registered adapters keyed by source identifier.
    adapters: BTreeMap<SourceId, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registers an adapter under its own source identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRegistryError::DuplicateSource`] when the identifier
    /// is already taken.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) -> Result<(), SourceRegistryError> {
        let id = adapter.source_id().clone();
        if self.adapters.contains_key(&id) {
            return Err(SourceRegistryError::DuplicateSource {
                id,
            });
        }
        self.adapters.insert(id, adapter);
        Ok(())
    }

    /// Looks up an adapter by identifier.
    #[must_use]
    pub fn get(&self, id: &SourceId) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(id).map(Arc::clone)
    }

    /// Returns registered source identifiers in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&SourceId> {
        self.adapters.keys().collect()
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true when no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Converts the registry into an aggregator with the given deadline.
    #[must_use]
    pub fn into_aggregator(self, deadline: Duration) -> ContextAggregator {
        let mut aggregator = ContextAggregator::new(deadline);
        for adapter in self.adapters.into_values() {
            aggregator.register_adapter(adapter);
        }
        aggregator
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}
