// trendlens-core/src/core/mod.rs
// ============================================================================
// Module: Trendlens Core Types
// Description: Capability descriptors, routing, validation, and sampling.
// Purpose: Group the pure data-model and construction modules.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The core modules are pure: descriptors and templates are immutable after
//! registration, URIs are parsed fresh per request, and sampling requests are
//! inert data constructed once and never mutated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capability;
pub mod registry;
pub mod sampling;
pub mod uri;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capability::CapabilityDescriptor;
pub use capability::CapabilityError;
pub use capability::CapabilityKind;
pub use capability::ParamSpec;
pub use capability::ParamType;
pub use capability::ValidationFailure;
pub use registry::CapabilityRegistry;
pub use registry::RegistryError;
pub use sampling::Annotations;
pub use sampling::IncludeContext;
pub use sampling::Message;
pub use sampling::MessageContent;
pub use sampling::ModelHint;
pub use sampling::ModelPreferences;
pub use sampling::Priorities;
pub use sampling::Role;
pub use sampling::SamplingInputs;
pub use sampling::SamplingMeta;
pub use sampling::SamplingParams;
pub use sampling::SamplingRequest;
pub use sampling::DEFAULT_PRIORITY;
pub use sampling::MAX_TOKENS_CEILING;
pub use sampling::PROTOCOL_VERSION;
pub use sampling::SAMPLING_METHOD;
pub use sampling::build_sampling_request;
pub use uri::ResolvedResource;
pub use uri::ResourceTemplate;
pub use uri::ResourceUri;
pub use uri::TemplateSegment;
pub use uri::UriRouter;
pub use validate::ValidatedArgs;
pub use validate::validate;
