// trendlens-sources/src/lib.rs
// ============================================================================
// Module: Trendlens Sources Library
// Description: Built-in source adapters for external data providers.
// Purpose: Expose bounded HTTP-backed adapters behind the core boundary.
// Dependencies: trendlens-core, reqwest
// ============================================================================

//! ## Overview
//! Source adapters wrap external HTTP APIs behind the
//! [`trendlens_core::SourceAdapter`] interface. Every adapter bounds its
//! outbound concurrency with a semaphore, applies per-request timeouts, and
//! retries only transient failures. Provider responses are normalized before
//! they cross the boundary; raw provider payloads never reach callers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod github;
pub mod hackernews;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::FetchFailure;
pub use client::HttpSourceConfig;
pub use client::SourceClient;
pub use client::SourceClientError;
pub use github::GitHubAdapter;
pub use github::GITHUB_SOURCE_ID;
pub use hackernews::HackerNewsAdapter;
pub use hackernews::HACKERNEWS_SOURCE_ID;
pub use registry::SourceRegistry;
pub use registry::SourceRegistryError;
