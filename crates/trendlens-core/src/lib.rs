// trendlens-core/src/lib.rs
// ============================================================================
// Module: Trendlens Core Library
// Description: Public API surface for the Trendlens core.
// Purpose: Expose capability, routing, validation, and aggregation types.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Trendlens core provides the capability registry, resource URI routing,
//! scalar schema validation, sampling-request synthesis, and the concurrent
//! context-aggregation pipeline. It is transport-agnostic and performs no
//! network I/O; external sources integrate through the
//! [`interfaces::SourceAdapter`] boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::FetchErrorKind;
pub use interfaces::FetchResult;
pub use interfaces::SourceAdapter;
pub use interfaces::SourceId;
pub use interfaces::SourceQuery;
pub use runtime::AggregatedContext;
pub use runtime::ContextAggregator;
pub use runtime::SourceRequest;
