// crates/trendlens-core/tests/registry.rs
// ============================================================================
// Module: Capability Registry Tests
// Description: Registration uniqueness and listing-order tests.
// Purpose: Ensure the capability catalog stays deterministic and collision-free.
// Dependencies: trendlens-core
// ============================================================================

//! Registration behavior tests for the capability registry.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use trendlens_core::CapabilityDescriptor;
use trendlens_core::CapabilityKind;
use trendlens_core::CapabilityRegistry;
use trendlens_core::ParamSpec;
use trendlens_core::ParamType;
use trendlens_core::RegistryError;

fn descriptor(name: &str, kind: CapabilityKind) -> CapabilityDescriptor {
    CapabilityDescriptor {
        name: name.to_string(),
        kind,
        description: format!("test capability {name}"),
        params: vec![ParamSpec::optional("limit", ParamType::Number, "result limit")],
    }
}

#[test]
fn duplicate_kind_and_name_is_rejected() {
    let mut registry = CapabilityRegistry::new();
    registry.register(descriptor("search_hackernews", CapabilityKind::Tool)).expect("registers");

    let error = registry
        .register(descriptor("search_hackernews", CapabilityKind::Tool))
        .expect_err("duplicate is rejected");
    assert_eq!(
        error,
        RegistryError::DuplicateCapability {
            kind: CapabilityKind::Tool,
            name: "search_hackernews".to_string(),
        }
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn same_name_across_kinds_is_allowed() {
    let mut registry = CapabilityRegistry::new();
    registry.register(descriptor("trends", CapabilityKind::Tool)).expect("tool registers");
    registry.register(descriptor("trends", CapabilityKind::Prompt)).expect("prompt registers");

    assert!(registry.lookup(CapabilityKind::Tool, "trends").is_some());
    assert!(registry.lookup(CapabilityKind::Prompt, "trends").is_some());
    assert!(registry.lookup(CapabilityKind::ResourceTemplate, "trends").is_none());
}

#[test]
fn listing_preserves_registration_order() {
    let mut registry = CapabilityRegistry::new();
    for name in ["gamma", "alpha", "beta"] {
        registry.register(descriptor(name, CapabilityKind::Tool)).expect("registers");
    }
    registry.register(descriptor("zeta", CapabilityKind::Prompt)).expect("registers");

    let names: Vec<&str> = registry
        .list(CapabilityKind::Tool)
        .iter()
        .map(|descriptor| descriptor.name.as_str())
        .collect();
    assert_eq!(names, ["gamma", "alpha", "beta"]);
    assert_eq!(registry.list(CapabilityKind::Prompt).len(), 1);
    assert_eq!(registry.len(), 4);
}

#[test]
fn empty_registry_reports_empty() {
    let registry = CapabilityRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.list(CapabilityKind::Tool).is_empty());
}
