// trendlens-core/src/core/uri.rs
// ============================================================================
// Module: Resource URI Router
// Description: Parser and template router for resource identifiers.
// Purpose: Decode hierarchical resource URIs into typed template matches.
// Dependencies: crate::core::{capability, registry}
// ============================================================================

//! ## Overview
//! Resource identifiers follow the grammar
//! `scheme://segment[/segment]*[?key=value[&key=value]*]`. Templates declare
//! literal and placeholder segments plus the query parameter names they
//! accept. Matching selects the template with the most concrete leading
//! segments agreeing with the input; ties are broken by declaration order
//! (first registered wins). The tie-break is deterministic and load-bearing:
//! templates may overlap, e.g. `sampling://{kind}/{count}` and
//! `sampling://hackernews/{count}`.
//!
//! ## Invariants
//! - Query keys are unique within a URI; duplicates are a validation failure.
//! - Unknown query keys are rejected, never silently ignored.
//! - No two registered templates share an identical match set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::capability::CapabilityError;
use crate::core::capability::ValidationFailure;
use crate::core::registry::RegistryError;

// ============================================================================
// SECTION: Parsed URIs
// ============================================================================

/// Parsed resource identifier. Parsed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    /// URI scheme.
    pub scheme: String,
    /// Ordered path segments.
    pub segments: Vec<String>,
    /// Query parameters with unique keys.
    pub query: BTreeMap<String, String>,
}

impl ResourceUri {
    /// Parses a resource identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::ValidationFailed`] listing every grammar
    /// violation: missing scheme separator, empty scheme, malformed query
    /// pairs, and duplicate query keys.
    pub fn parse(input: &str) -> Result<Self, CapabilityError> {
        let mut failures = Vec::new();
        let Some((scheme, rest)) = input.split_once("://") else {
            return Err(CapabilityError::invalid("uri", "missing scheme separator"));
        };
        if scheme.is_empty() {
            failures.push(ValidationFailure::new("uri", "empty scheme"));
        }
        let (path, raw_query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let segments: Vec<String> =
            path.split('/').filter(|segment| !segment.is_empty()).map(str::to_string).collect();
        let mut query = BTreeMap::new();
        if let Some(raw_query) = raw_query {
            for pair in raw_query.split('&') {
                if pair.is_empty() {
                    failures.push(ValidationFailure::new("uri", "empty query pair"));
                    continue;
                }
                let Some((key, value)) = pair.split_once('=') else {
                    failures.push(ValidationFailure::new(
                        "uri",
                        format!("query pair missing '=': {pair}"),
                    ));
                    continue;
                };
                if query.insert(key.to_string(), value.to_string()).is_some() {
                    failures
                        .push(ValidationFailure::new(key, "duplicate query key".to_string()));
                }
            }
        }
        if failures.is_empty() {
            Ok(Self {
                scheme: scheme.to_string(),
                segments,
                query,
            })
        } else {
            Err(CapabilityError::ValidationFailed(failures))
        }
    }
}

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Single segment of a template path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal segment that must match exactly.
    Literal(String),
    /// Named placeholder binding one concrete segment.
    Placeholder(String),
}

/// Registered resource template owned by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTemplate {
    /// Template name, referenced by the capability registry.
    pub name: String,
    /// URI scheme the template matches.
    pub scheme: String,
    /// Ordered path pattern segments.
    pub segments: Vec<TemplateSegment>,
    /// Declared optional query parameter names.
    pub query_params: Vec<String>,
}

impl ResourceTemplate {
    /// Parses a template pattern such as `hackernews://top/{limit}`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidTemplate`] for malformed patterns or
    /// repeated placeholder names.
    pub fn parse(
        name: &str,
        pattern: &str,
        query_params: &[&str],
    ) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidTemplate {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let Some((scheme, rest)) = pattern.split_once("://") else {
            return Err(invalid("missing scheme separator"));
        };
        if scheme.is_empty() {
            return Err(invalid("empty scheme"));
        }
        let mut segments = Vec::new();
        let mut seen = Vec::new();
        for raw in rest.split('/').filter(|segment| !segment.is_empty()) {
            if let Some(placeholder) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if placeholder.is_empty() {
                    return Err(invalid("empty placeholder name"));
                }
                if seen.contains(&placeholder) {
                    return Err(invalid("repeated placeholder name"));
                }
                seen.push(placeholder);
                segments.push(TemplateSegment::Placeholder(placeholder.to_string()));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(invalid("unbalanced placeholder braces"));
            } else {
                segments.push(TemplateSegment::Literal(raw.to_string()));
            }
        }
        Ok(Self {
            name: name.to_string(),
            scheme: scheme.to_string(),
            segments,
            query_params: query_params.iter().map(|param| (*param).to_string()).collect(),
        })
    }

    /// Returns true when both templates match exactly the same concrete URIs.
    #[must_use]
    pub fn same_match_set(&self, other: &Self) -> bool {
        if self.scheme != other.scheme || self.segments.len() != other.segments.len() {
            return false;
        }
        self.segments.iter().zip(&other.segments).all(|(left, right)| match (left, right) {
            (TemplateSegment::Literal(a), TemplateSegment::Literal(b)) => a == b,
            (TemplateSegment::Placeholder(_), TemplateSegment::Placeholder(_)) => true,
            _ => false,
        })
    }

    /// Binds path placeholders when the URI matches this template.
    fn bind(&self, uri: &ResourceUri) -> Option<BTreeMap<String, String>> {
        if uri.scheme != self.scheme || uri.segments.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (pattern, concrete) in self.segments.iter().zip(&uri.segments) {
            match pattern {
                TemplateSegment::Literal(literal) => {
                    if literal != concrete {
                        return None;
                    }
                }
                TemplateSegment::Placeholder(name) => {
                    params.insert(name.clone(), concrete.clone());
                }
            }
        }
        Some(params)
    }

    /// Counts leading segments that are literal and agree with the input.
    fn leading_specificity(&self, uri: &ResourceUri) -> usize {
        self.segments
            .iter()
            .zip(&uri.segments)
            .take_while(|(pattern, concrete)| match pattern {
                TemplateSegment::Literal(literal) => literal == *concrete,
                TemplateSegment::Placeholder(_) => false,
            })
            .count()
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Resolved template match with extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Name of the matched template.
    pub template: String,
    /// Extracted path and query parameters as raw strings.
    pub params: BTreeMap<String, String>,
}

/// Router over registered resource templates.
///
/// # Invariants
/// - Templates are registered at startup only; lookups are read-only.
/// - Declaration order is preserved for deterministic tie-breaking.
#[derive(Debug, Default)]
pub struct UriRouter {
    /// Registered templates in declaration order.
    templates: Vec<ResourceTemplate>,
}

impl UriRouter {
    /// Creates an empty router.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    /// Registers a template, enforcing the pairwise-uniqueness property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the template name is already taken or
    /// an existing template has an identical match set.
    pub fn register(&mut self, template: ResourceTemplate) -> Result<(), RegistryError> {
        for existing in &self.templates {
            if existing.name == template.name {
                return Err(RegistryError::DuplicateTemplate {
                    name: template.name,
                });
            }
            if existing.same_match_set(&template) {
                return Err(RegistryError::AmbiguousTemplate {
                    first: existing.name.clone(),
                    second: template.name,
                });
            }
        }
        self.templates.push(template);
        Ok(())
    }

    /// Returns registered templates in declaration order.
    #[must_use]
    pub fn templates(&self) -> &[ResourceTemplate] {
        &self.templates
    }

    /// Resolves a resource identifier against the registered templates.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::ValidationFailed`] for grammar violations
    /// and unknown query keys, and [`CapabilityError::NotFound`] when no
    /// template matches.
    pub fn resolve(&self, input: &str) -> Result<ResolvedResource, CapabilityError> {
        let uri = ResourceUri::parse(input)?;
        let mut best: Option<(usize, usize, BTreeMap<String, String>)> = None;
        for (index, template) in self.templates.iter().enumerate() {
            let Some(bound) = template.bind(&uri) else {
                continue;
            };
            let specificity = template.leading_specificity(&uri);
            let better = match &best {
                Some((best_specificity, _, _)) => specificity > *best_specificity,
                None => true,
            };
            if better {
                best = Some((specificity, index, bound));
            }
        }
        let Some((_, index, mut params)) = best else {
            return Err(CapabilityError::NotFound(input.to_string()));
        };
        let template = &self.templates[index];
        let mut failures = Vec::new();
        for (key, value) in &uri.query {
            if template.query_params.iter().any(|declared| declared == key) {
                params.insert(key.clone(), value.clone());
            } else {
                failures.push(ValidationFailure::new(key, "unknown query key"));
            }
        }
        if !failures.is_empty() {
            return Err(CapabilityError::ValidationFailed(failures));
        }
        Ok(ResolvedResource {
            template: template.name.clone(),
            params,
        })
    }
}
