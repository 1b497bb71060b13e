// trendlens-mcp/src/lib.rs
// ============================================================================
// Module: Trendlens MCP
// Description: MCP server exposing trend capabilities over JSON-RPC 2.0.
// Purpose: Wire the capability catalog, sources, and transports together.
// Dependencies: trendlens-core, trendlens-sources, axum, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the MCP surface of Trendlens: a capability catalog of
//! tools, resource templates, and prompts; a dispatcher routing validated
//! calls through the context aggregator; and JSON-RPC 2.0 transports over
//! framed stdio and HTTP. The server prepares sampling requests for its
//! clients but never executes a model itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod dispatch;
mod prompts;
mod resources;
pub mod server;
mod synthetic;
pub mod telemetry;
mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::CatalogError;
pub use config::ConfigError;
pub use config::TrendlensConfig;
pub use dispatch::DispatchError;
pub use dispatch::Dispatcher;
pub use server::McpServer;
pub use server::McpServerError;
