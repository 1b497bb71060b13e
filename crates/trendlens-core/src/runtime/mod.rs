// trendlens-core/src/runtime/mod.rs
// ============================================================================
// Module: Trendlens Runtime
// Description: Concurrent context-aggregation pipeline.
// Purpose: Group the async runtime modules built on the adapter boundary.
// Dependencies: crate::interfaces, tokio
// ============================================================================

//! ## Overview
//! Runtime modules orchestrate source adapters under a shared deadline. They
//! hold no business logic of their own: adapters classify failures, the
//! aggregator only collects and bounds them in time.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::AggregatedContext;
pub use aggregate::ContextAggregator;
pub use aggregate::SourceRequest;
