// trendlens-mcp/src/dispatch.rs
// ============================================================================
// Module: Capability Dispatch
// Description: Facade routing validated capability calls to their handlers.
// Purpose: Own the catalog, aggregator, and sampling defaults per server.
// Dependencies: crate::{analysis, catalog, config, prompts, resources, tools}
// ============================================================================

//! ## Overview
//! The dispatcher is the single entry point between transport and handlers.
//! Every call follows the same path: catalog lookup, argument validation,
//! handler execution, structured result or [`CapabilityError`]. Handlers
//! that need external data go through the shared context aggregator; a
//! dispatcher-level failure is terminal for that call and surfaced to the
//! transport, never retried here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use trendlens_core::CapabilityError;
use trendlens_core::ContextAggregator;
use trendlens_core::FetchResult;
use trendlens_core::SourceId;
use trendlens_core::SourceQuery;
use trendlens_core::SourceRequest;
use trendlens_sources::GitHubAdapter;
use trendlens_sources::HackerNewsAdapter;
use trendlens_sources::SourceClientError;
use trendlens_sources::SourceRegistry;
use trendlens_sources::SourceRegistryError;

use crate::catalog::Catalog;
use crate::catalog::CatalogError;
use crate::catalog::PromptDefinition;
use crate::catalog::ResourceDefinition;
use crate::catalog::ToolDefinition;
use crate::config::SamplingConfig;
use crate::config::TrendlensConfig;
use crate::prompts;
use crate::resources;
use crate::tools;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatcher construction failures, fatal at startup.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The capability catalog could not be built.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A source adapter registration was rejected.
    #[error(transparent)]
    Sources(#[from] SourceRegistryError),
    /// A source HTTP client could not be constructed.
    #[error(transparent)]
    Client(#[from] SourceClientError),
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Capability dispatch facade shared by all transports.
#[derive(Debug)]
pub struct Dispatcher {
    /// Capability catalog built at startup.
    pub(crate) catalog: Catalog,
    /// Deadline-bounded aggregator over registered sources.
    pub(crate) aggregator: ContextAggregator,
    /// Sampling synthesis defaults.
    pub(crate) sampling: SamplingConfig,
}

impl Dispatcher {
    /// Builds a dispatcher with adapters constructed from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the catalog or an adapter cannot be
    /// built.
    pub fn from_config(config: &TrendlensConfig) -> Result<Self, DispatchError> {
        let mut registry = SourceRegistry::new();
        if config.sources.hackernews.enabled {
            let adapter = HackerNewsAdapter::new(&config.sources.hackernews.to_http_config())?;
            registry.register(std::sync::Arc::new(adapter))?;
        }
        if config.sources.github.enabled {
            let adapter = GitHubAdapter::new(&config.sources.github.to_http_config())?;
            registry.register(std::sync::Arc::new(adapter))?;
        }
        Self::with_sources(config, registry)
    }

    /// Builds a dispatcher over an existing source registry.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the capability catalog cannot be
    /// built.
    pub fn with_sources(
        config: &TrendlensConfig,
        registry: SourceRegistry,
    ) -> Result<Self, DispatchError> {
        Ok(Self {
            catalog: Catalog::build()?,
            aggregator: registry
                .into_aggregator(Duration::from_millis(config.aggregation.deadline_ms)),
            sampling: config.sampling.clone(),
        })
    }

    /// Lists every registered tool.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.catalog.tool_definitions()
    }

    /// Lists every registered resource template.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.catalog.resource_definitions()
    }

    /// Lists every registered prompt.
    #[must_use]
    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.catalog.prompt_definitions()
    }

    /// Validates and executes a tool call.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] for unknown tools, invalid arguments,
    /// unavailable sources, and handler failures.
    pub async fn call_tool(&self, name: &str, args: &Value) -> Result<Value, CapabilityError> {
        self.catalog.validate_tool_args(name, args)?;
        tools::call(self, name, args).await
    }

    /// Resolves and reads a resource URI.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] for unmatched URIs, invalid parameters,
    /// unavailable sources, and handler failures.
    pub async fn read_resource(&self, uri: &str) -> Result<Value, CapabilityError> {
        let (template, params) = self.catalog.resolve_resource(uri)?;
        resources::read(self, &template, &params).await
    }

    /// Validates prompt arguments and renders the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] for unknown prompts and invalid
    /// arguments.
    pub fn get_prompt(&self, name: &str, args: &Value) -> Result<Value, CapabilityError> {
        let validated = self.catalog.validate_prompt_args(name, args)?;
        prompts::render(name, &validated)
    }

    /// Fetches one record from a required source through the aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SourceUnavailable`] when the source
    /// settles as failed, and [`CapabilityError::Internal`] when the
    /// aggregator drops the entry entirely.
    pub(crate) async fn fetch_required(
        &self,
        source: &str,
        operation: &str,
        params: Value,
    ) -> Result<Value, CapabilityError> {
        let id = SourceId::new(source);
        let request = SourceRequest::required(
            id.clone(),
            SourceQuery {
                operation: operation.to_string(),
                params,
            },
        );
        let mut context = self.aggregator.aggregate(&[request]).await;
        match context.results.remove(&id) {
            Some(FetchResult::Ok(record)) => Ok(record),
            Some(FetchResult::Failed {
                source,
                kind,
                ..
            }) => Err(CapabilityError::SourceUnavailable {
                source_id: source,
                cause: kind,
            }),
            None => Err(CapabilityError::Internal(format!("source {id} produced no result"))),
        }
    }
}
