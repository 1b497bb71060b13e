// trendlens-core/src/core/registry.rs
// ============================================================================
// Module: Capability Registry
// Description: Uniqueness-enforcing store for capability descriptors.
// Purpose: Own the immutable capability catalog consulted at dispatch time.
// Dependencies: crate::core::capability, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated once at startup and read-only afterwards.
//! Capability names are unique within their kind; registration order is
//! preserved so listings are deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::capability::CapabilityDescriptor;
use crate::core::capability::CapabilityKind;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration failures raised while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A capability with this kind and name is already registered.
    #[error("duplicate {kind} capability: {name}", kind = kind.as_str())]
    DuplicateCapability {
        /// Capability kind of the rejected registration.
        kind: CapabilityKind,
        /// Conflicting capability name.
        name: String,
    },
    /// A resource template with this name is already registered.
    #[error("duplicate resource template: {name}")]
    DuplicateTemplate {
        /// Conflicting template name.
        name: String,
    },
    /// Two resource templates would match exactly the same URIs.
    #[error("ambiguous resource templates: {first} and {second}")]
    AmbiguousTemplate {
        /// Previously registered template name.
        first: String,
        /// Rejected template name.
        second: String,
    },
    /// The template pattern could not be parsed.
    #[error("invalid resource template {name}: {reason}")]
    InvalidTemplate {
        /// Template name of the rejected registration.
        name: String,
        /// Parse failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Ordered capability catalog with per-kind name uniqueness.
///
/// # Invariants
/// - Registration order is preserved for deterministic listings.
/// - At most one descriptor exists per (kind, name) pair.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    /// Descriptors in registration order.
    entries: Vec<CapabilityDescriptor>,
    /// Index from (kind, name) to position in `entries`.
    index: BTreeMap<(CapabilityKind, String), usize>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Registers a capability descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCapability`] when a descriptor with
    /// the same kind and name already exists.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        let key = (descriptor.kind, descriptor.name.clone());
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateCapability {
                kind: descriptor.kind,
                name: descriptor.name,
            });
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by kind and name.
    #[must_use]
    pub fn lookup(&self, kind: CapabilityKind, name: &str) -> Option<&CapabilityDescriptor> {
        self.index.get(&(kind, name.to_string())).map(|position| &self.entries[*position])
    }

    /// Returns descriptors of one kind in registration order.
    #[must_use]
    pub fn list(&self, kind: CapabilityKind) -> Vec<&CapabilityDescriptor> {
        self.entries.iter().filter(|descriptor| descriptor.kind == kind).collect()
    }

    /// Returns the total number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no capabilities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
