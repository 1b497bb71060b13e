// trendlens-core/src/core/capability.rs
// ============================================================================
// Module: Capability Descriptors
// Description: Descriptor and error types for callable capabilities.
// Purpose: Define the closed capability kinds and their parameter schemas.
// Dependencies: crate::interfaces, serde, thiserror
// ============================================================================

//! ## Overview
//! A capability is a named callable unit exposed to callers: a tool, a
//! resource template, or a prompt template. Descriptors declare an ordered
//! parameter schema that the validator enforces before dispatch.
//!
//! ## Invariants
//! - Descriptors are immutable after registration.
//! - Capability names are unique within their kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::interfaces::FetchErrorKind;
use crate::interfaces::SourceId;

// ============================================================================
// SECTION: Capability Kinds
// ============================================================================

/// Closed set of capability kinds exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Callable tool with JSON arguments.
    Tool,
    /// Parameterized resource identified by a URI template.
    ResourceTemplate,
    /// Prompt template rendered with validated arguments.
    Prompt,
}

impl CapabilityKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::ResourceTemplate => "resource_template",
            Self::Prompt => "prompt",
        }
    }
}

// ============================================================================
// SECTION: Parameter Schemas
// ============================================================================

/// Scalar parameter types accepted by capability schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// UTF-8 string parameter.
    String,
    /// Numeric parameter (integers and floats).
    Number,
    /// Boolean parameter.
    Boolean,
    /// Structured JSON object parameter.
    Object,
}

impl ParamType {
    /// Returns a stable label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

/// Declared parameter specification within a capability schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared scalar type.
    pub param_type: ParamType,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Inclusive numeric range constraint for number parameters.
    pub range: Option<(f64, f64)>,
    /// Allowed values constraint for string parameters.
    pub one_of: Option<Vec<String>>,
    /// Human-readable parameter description.
    pub description: String,
}

impl ParamSpec {
    /// Creates a required parameter with no value constraints.
    #[must_use]
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: true,
            range: None,
            one_of: None,
            description: description.to_string(),
        }
    }

    /// Creates an optional parameter with no value constraints.
    #[must_use]
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: false,
            range: None,
            one_of: None,
            description: description.to_string(),
        }
    }

    /// Attaches an inclusive numeric range constraint.
    #[must_use]
    pub const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Attaches an allowed-values constraint.
    #[must_use]
    pub fn with_one_of(mut self, values: &[&str]) -> Self {
        self.one_of = Some(values.iter().map(|value| (*value).to_string()).collect());
        self
    }
}

/// Immutable capability descriptor owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Capability name, unique within its kind.
    pub name: String,
    /// Capability kind.
    pub kind: CapabilityKind,
    /// Human-readable capability description.
    pub description: String,
    /// Ordered parameter schema.
    pub params: Vec<ParamSpec>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Offending field name.
    pub field: String,
    /// Caller-fixable failure reason.
    pub reason: String,
}

impl ValidationFailure {
    /// Creates a validation failure for a field.
    #[must_use]
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Capability dispatch errors returned to the transport.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// One or more caller-fixable validation failures.
    #[error("validation failed: {}", format_failures(.0))]
    ValidationFailed(Vec<ValidationFailure>),
    /// External source could not satisfy a required fetch.
    #[error("source unavailable: {source_id}: {cause}")]
    SourceUnavailable {
        /// Failing source identifier.
        source_id: SourceId,
        /// Classified failure cause.
        cause: FetchErrorKind,
    },
    /// Unknown capability name or unmatched resource URI.
    #[error("not found: {0}")]
    NotFound(String),
    /// Invariant violation surfaced as an opaque failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CapabilityError {
    /// Wraps a single validation failure.
    #[must_use]
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![ValidationFailure::new(field, reason)])
    }
}

/// Joins validation failures into a single display string.
fn format_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.field, failure.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
