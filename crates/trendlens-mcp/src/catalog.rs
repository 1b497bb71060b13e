// trendlens-mcp/src/catalog.rs
// ============================================================================
// Module: Capability Catalog
// Description: Declares every tool, resource template, and prompt.
// Purpose: Build the registry, router, and compiled tool schemas at startup.
// Dependencies: trendlens-core, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! The catalog is the single place capabilities are declared. Building it
//! registers every descriptor with the registry, every URI pattern with the
//! router, and compiles every tool input schema under JSON Schema draft
//! 2020-12. Declaration mistakes (duplicate names, ambiguous templates,
//! uncompilable schemas) fail at startup, never at request time.
//!
//! Tool arguments arrive as typed JSON and are validated against the
//! compiled schemas. Resource and prompt arguments arrive as strings and go
//! through the coercing scalar validator instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use jsonschema::Draft;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use trendlens_core::CapabilityDescriptor;
use trendlens_core::CapabilityError;
use trendlens_core::CapabilityKind;
use trendlens_core::CapabilityRegistry;
use trendlens_core::ParamSpec;
use trendlens_core::ParamType;
use trendlens_core::RegistryError;
use trendlens_core::ResourceTemplate;
use trendlens_core::UriRouter;
use trendlens_core::ValidatedArgs;
use trendlens_core::ValidationFailure;
use trendlens_core::validate;

// ============================================================================
// SECTION: Listing Payloads
// ============================================================================

/// Tool definition returned by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable tool description.
    pub description: String,
    /// JSON Schema for the tool arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Resource template definition returned by `resources/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDefinition {
    /// URI template pattern.
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    /// Template name.
    pub name: String,
    /// Human-readable template description.
    pub description: String,
}

/// Prompt argument definition returned by `prompts/list`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Human-readable argument description.
    pub description: String,
    /// Whether the argument must be provided.
    pub required: bool,
}

/// Prompt definition returned by `prompts/list`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Human-readable prompt description.
    pub description: String,
    /// Declared prompt arguments.
    pub arguments: Vec<PromptArgument>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog construction failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A descriptor or template registration was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A generated tool schema failed to compile.
    #[error("invalid schema for tool {name}: {reason}")]
    Schema {
        /// Tool the schema was generated for.
        name: String,
        /// Compile failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Compiled tool entry: generated schema plus its validator.
struct CompiledTool {
    /// Generated JSON Schema document.
    schema: Value,
    /// Compiled draft 2020-12 validator.
    validator: Validator,
}

/// Immutable capability catalog built at startup.
pub struct Catalog {
    /// Descriptor registry for all capability kinds.
    registry: CapabilityRegistry,
    /// Resource URI router.
    router: UriRouter,
    /// Compiled tool schemas keyed by tool name.
    tools: BTreeMap<String, CompiledTool>,
    /// Template patterns keyed by template name, in declaration order.
    patterns: Vec<(String, String)>,
}

impl Catalog {
    /// Builds the full capability catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a declaration is rejected or a tool
    /// schema fails to compile.
    pub fn build() -> Result<Self, CatalogError> {
        let mut catalog = Self {
            registry: CapabilityRegistry::new(),
            router: UriRouter::new(),
            tools: BTreeMap::new(),
            patterns: Vec::new(),
        };
        for descriptor in tool_descriptors() {
            catalog.add_tool(descriptor)?;
        }
        for (descriptor, pattern, query_params) in resource_descriptors() {
            catalog.add_resource(descriptor, &pattern, &query_params)?;
        }
        for descriptor in prompt_descriptors() {
            catalog.registry.register(descriptor)?;
        }
        Ok(catalog)
    }

    /// Registers a tool and compiles its input schema.
    fn add_tool(&mut self, descriptor: CapabilityDescriptor) -> Result<(), CatalogError> {
        let schema = input_schema(&descriptor);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| CatalogError::Schema {
                name: descriptor.name.clone(),
                reason: err.to_string(),
            })?;
        self.tools.insert(
            descriptor.name.clone(),
            CompiledTool {
                schema,
                validator,
            },
        );
        self.registry.register(descriptor)?;
        Ok(())
    }

    /// Registers a resource template and its parameter descriptor.
    fn add_resource(
        &mut self,
        descriptor: CapabilityDescriptor,
        pattern: &str,
        query_params: &[&str],
    ) -> Result<(), CatalogError> {
        let template = ResourceTemplate::parse(&descriptor.name, pattern, query_params)?;
        self.router.register(template)?;
        self.patterns.push((descriptor.name.clone(), pattern.to_string()));
        self.registry.register(descriptor)?;
        Ok(())
    }

    /// Returns tool definitions in declaration order.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry
            .list(CapabilityKind::Tool)
            .into_iter()
            .map(|descriptor| ToolDefinition {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                input_schema: self
                    .tools
                    .get(&descriptor.name)
                    .map_or(Value::Null, |tool| tool.schema.clone()),
            })
            .collect()
    }

    /// Returns resource template definitions in declaration order.
    #[must_use]
    pub fn resource_definitions(&self) -> Vec<ResourceDefinition> {
        self.patterns
            .iter()
            .filter_map(|(name, pattern)| {
                self.registry.lookup(CapabilityKind::ResourceTemplate, name).map(|descriptor| {
                    ResourceDefinition {
                        uri_template: pattern.clone(),
                        name: descriptor.name.clone(),
                        description: descriptor.description.clone(),
                    }
                })
            })
            .collect()
    }

    /// Returns prompt definitions in declaration order.
    #[must_use]
    pub fn prompt_definitions(&self) -> Vec<PromptDefinition> {
        self.registry
            .list(CapabilityKind::Prompt)
            .into_iter()
            .map(|descriptor| PromptDefinition {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                arguments: descriptor
                    .params
                    .iter()
                    .map(|param| PromptArgument {
                        name: param.name.clone(),
                        description: param.description.clone(),
                        required: param.required,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Validates tool arguments against the compiled schema.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotFound`] for unknown tools and
    /// [`CapabilityError::ValidationFailed`] listing every schema violation.
    pub fn validate_tool_args(&self, name: &str, args: &Value) -> Result<(), CapabilityError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| CapabilityError::NotFound(format!("tool: {name}")))?;
        let normalized = if args.is_null() { &json!({}) } else { args };
        let failures: Vec<ValidationFailure> = tool
            .validator
            .iter_errors(normalized)
            .map(|error| {
                let path = error.instance_path().to_string();
                let field = if path.is_empty() {
                    "arguments".to_string()
                } else {
                    path.trim_start_matches('/').replace('/', ".")
                };
                ValidationFailure::new(&field, error.to_string())
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CapabilityError::ValidationFailed(failures))
        }
    }

    /// Resolves a resource URI and validates its extracted parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotFound`] when no template matches and
    /// [`CapabilityError::ValidationFailed`] listing every parameter
    /// violation.
    pub fn resolve_resource(&self, uri: &str) -> Result<(String, ValidatedArgs), CapabilityError> {
        let resolved = self.router.resolve(uri)?;
        let descriptor = self
            .registry
            .lookup(CapabilityKind::ResourceTemplate, &resolved.template)
            .ok_or_else(|| {
                CapabilityError::Internal(format!("unregistered template: {}", resolved.template))
            })?;
        let raw = Value::Object(
            resolved
                .params
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        );
        let args = validate(descriptor, &raw).map_err(CapabilityError::ValidationFailed)?;
        Ok((resolved.template, args))
    }

    /// Looks up a prompt descriptor and validates its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotFound`] for unknown prompts and
    /// [`CapabilityError::ValidationFailed`] listing every violation.
    pub fn validate_prompt_args(
        &self,
        name: &str,
        args: &Value,
    ) -> Result<ValidatedArgs, CapabilityError> {
        let descriptor = self
            .registry
            .lookup(CapabilityKind::Prompt, name)
            .ok_or_else(|| CapabilityError::NotFound(format!("prompt: {name}")))?;
        validate(descriptor, args).map_err(CapabilityError::ValidationFailed)
    }

    /// Returns the descriptor registry.
    #[must_use]
    pub const fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("capabilities", &self.registry.len()).finish()
    }
}

// ============================================================================
// SECTION: Schema Generation
// ============================================================================

/// Generates a JSON Schema document from a capability descriptor.
#[must_use]
pub fn input_schema(descriptor: &CapabilityDescriptor) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in &descriptor.params {
        properties.insert(param.name.clone(), param_schema(param));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
        "additionalProperties": false,
    })
}

/// Generates the schema for one declared parameter.
fn param_schema(param: &ParamSpec) -> Value {
    let mut schema = serde_json::Map::new();
    let type_name = match param.param_type {
        ParamType::String => "string",
        ParamType::Number => "number",
        ParamType::Boolean => "boolean",
        ParamType::Object => "object",
    };
    schema.insert("type".to_string(), json!(type_name));
    schema.insert("description".to_string(), json!(param.description));
    if let Some((min, max)) = param.range {
        schema.insert("minimum".to_string(), json!(min));
        schema.insert("maximum".to_string(), json!(max));
    }
    if let Some(allowed) = &param.one_of {
        schema.insert("enum".to_string(), json!(allowed));
    }
    Value::Object(schema)
}

// ============================================================================
// SECTION: Declarations
// ============================================================================

/// Declares every tool descriptor.
fn tool_descriptors() -> Vec<CapabilityDescriptor> {
    vec![
        CapabilityDescriptor {
            name: "search_hackernews".to_string(),
            kind: CapabilityKind::Tool,
            description: "Search current Hacker News top stories by title".to_string(),
            params: vec![
                ParamSpec::required("query", ParamType::String, "Case-insensitive title match"),
                ParamSpec::optional("limit", ParamType::Number, "Maximum matches to return")
                    .with_range(1.0, 20.0),
            ],
        },
        CapabilityDescriptor {
            name: "get_github_repo_info".to_string(),
            kind: CapabilityKind::Tool,
            description: "Fetch normalized metadata for one GitHub repository".to_string(),
            params: vec![
                ParamSpec::required("owner", ParamType::String, "Repository owner login"),
                ParamSpec::required("repo", ParamType::String, "Repository name"),
            ],
        },
        CapabilityDescriptor {
            name: "create_sampling_request".to_string(),
            kind: CapabilityKind::Tool,
            description: "Construct a client-directed sampling request from a prompt".to_string(),
            params: vec![
                ParamSpec::required("prompt", ParamType::String, "Prompt text for the user message"),
                ParamSpec::optional("context_data", ParamType::Object, "Structured context appended to the prompt"),
                ParamSpec::optional("max_tokens", ParamType::Number, "Token budget for the completion")
                    .with_range(1.0, 4000.0),
                ParamSpec::optional("temperature", ParamType::Number, "Sampling temperature")
                    .with_range(0.0, 1.0),
                ParamSpec::optional("model_hint", ParamType::String, "Suggested model name or family"),
                ParamSpec::optional("intelligence_priority", ParamType::Number, "Weight on model capability")
                    .with_range(0.0, 1.0),
                ParamSpec::optional("cost_priority", ParamType::Number, "Weight on cost")
                    .with_range(0.0, 1.0),
                ParamSpec::optional("speed_priority", ParamType::Number, "Weight on latency")
                    .with_range(0.0, 1.0),
            ],
        },
        CapabilityDescriptor {
            name: "analyze_hackernews_trends".to_string(),
            kind: CapabilityKind::Tool,
            description: "Aggregate Hacker News stories and build a trend-analysis sampling request"
                .to_string(),
            params: vec![
                ParamSpec::optional("topic", ParamType::String, "Topic to filter stories by"),
                ParamSpec::optional("count", ParamType::Number, "Stories to aggregate")
                    .with_range(1.0, 20.0),
                ParamSpec::optional("analysis_type", ParamType::String, "Depth of the requested analysis")
                    .with_one_of(&["brief", "detailed", "comprehensive"]),
            ],
        },
        CapabilityDescriptor {
            name: "code_review_request".to_string(),
            kind: CapabilityKind::Tool,
            description: "Aggregate repository metadata and build a code-review sampling request"
                .to_string(),
            params: vec![
                ParamSpec::required("owner", ParamType::String, "Repository owner login"),
                ParamSpec::required("repo", ParamType::String, "Repository name"),
                ParamSpec::optional("review_focus", ParamType::String, "Focus area for the review")
                    .with_one_of(&["security", "performance", "architecture", "general"]),
            ],
        },
        CapabilityDescriptor {
            name: "analyze_trends".to_string(),
            kind: CapabilityKind::Tool,
            description: "Aggregate both sources concurrently and build a multi-source sampling request"
                .to_string(),
            params: vec![
                ParamSpec::optional("query", ParamType::String, "Story topic to search for"),
                ParamSpec::optional("language", ParamType::String, "Repository language filter"),
                ParamSpec::optional("story_count", ParamType::Number, "Stories to aggregate")
                    .with_range(1.0, 20.0),
                ParamSpec::optional("repo_count", ParamType::Number, "Repositories to aggregate")
                    .with_range(1.0, 10.0),
            ],
        },
    ]
}

/// Declares every resource template: descriptor, pattern, query parameters.
#[allow(clippy::too_many_lines, reason = "Single declaration table for all templates.")]
fn resource_descriptors() -> Vec<(CapabilityDescriptor, String, Vec<&'static str>)> {
    let entry = |name: &str, description: &str, params: Vec<ParamSpec>, pattern: &str,
                 query: Vec<&'static str>| {
        (
            CapabilityDescriptor {
                name: name.to_string(),
                kind: CapabilityKind::ResourceTemplate,
                description: description.to_string(),
                params,
            },
            pattern.to_string(),
            query,
        )
    };
    vec![
        entry("roots", "Catalog of URI schemes served by this server", Vec::new(), "roots://", Vec::new()),
        entry("server-status", "Server status and capability summary", Vec::new(), "status://server", Vec::new()),
        entry(
            "resource-index",
            "Registered resource template catalog",
            Vec::new(),
            "status://resources",
            Vec::new(),
        ),
        entry(
            "hackernews-top",
            "Current Hacker News top stories",
            vec![
                ParamSpec::required("limit", ParamType::Number, "Stories to return")
                    .with_range(1.0, 30.0),
            ],
            "hackernews://top/{limit}",
            Vec::new(),
        ),
        entry(
            "github-trending",
            "Most-starred repositories created inside a rolling window",
            vec![
                ParamSpec::required("language", ParamType::String, "Primary language filter"),
                ParamSpec::required("since", ParamType::String, "Rolling creation window")
                    .with_one_of(&["daily", "weekly", "monthly"]),
            ],
            "github://trending/{language}/{since}",
            Vec::new(),
        ),
        entry(
            "synthetic-samples",
            "Synthetic numeric samples for testing and demos",
            vec![
                ParamSpec::required("sampling_type", ParamType::String, "Sample generation strategy")
                    .with_one_of(&["random", "sequential", "distribution"]),
                ParamSpec::required("count", ParamType::Number, "Samples to generate")
                    .with_range(1.0, 1000.0),
            ],
            "sampling://{sampling_type}/{count}",
            Vec::new(),
        ),
        entry(
            "hackernews-samples",
            "Random sample of current top stories",
            vec![
                ParamSpec::required("count", ParamType::Number, "Stories to sample")
                    .with_range(1.0, 20.0),
            ],
            "sampling://hackernews/{count}",
            Vec::new(),
        ),
        entry(
            "repository-samples",
            "Random sample of popular repositories for a language",
            vec![
                ParamSpec::required("language", ParamType::String, "Primary language filter"),
                ParamSpec::required("count", ParamType::Number, "Repositories to sample")
                    .with_range(1.0, 10.0),
            ],
            "sampling://repositories/{language}/{count}",
            Vec::new(),
        ),
        entry(
            "hackernews-analysis",
            "Trend-analysis sampling request for a topic",
            vec![
                ParamSpec::required("topic", ParamType::String, "Topic to filter stories by"),
                ParamSpec::required("count", ParamType::Number, "Stories to aggregate")
                    .with_range(1.0, 20.0),
            ],
            "analysis://hackernews/{topic}/{count}",
            Vec::new(),
        ),
        entry(
            "github-analysis",
            "Code-review sampling request for a repository",
            vec![
                ParamSpec::required("owner", ParamType::String, "Repository owner login"),
                ParamSpec::required("repo", ParamType::String, "Repository name"),
            ],
            "analysis://github/{owner}/{repo}",
            Vec::new(),
        ),
        entry(
            "trend-analysis",
            "Multi-source trend analysis across both sources",
            vec![
                ParamSpec::optional("query", ParamType::String, "Story topic to search for"),
                ParamSpec::optional("language", ParamType::String, "Repository language filter"),
            ],
            "analysis://trends",
            vec!["query", "language"],
        ),
    ]
}

/// Declares every prompt descriptor.
fn prompt_descriptors() -> Vec<CapabilityDescriptor> {
    let prompt = |name: &str, description: &str, params: Vec<ParamSpec>| CapabilityDescriptor {
        name: name.to_string(),
        kind: CapabilityKind::Prompt,
        description: description.to_string(),
        params,
    };
    vec![
        prompt(
            "analyze_tech_trends",
            "Guide an analysis of current trends in a technology area",
            vec![
                ParamSpec::required("technology_area", ParamType::String, "Technology area to analyze"),
                ParamSpec::optional("time_period", ParamType::String, "Time period to cover"),
                ParamSpec::optional("detail_level", ParamType::String, "Requested level of detail"),
            ],
        ),
        prompt(
            "project_research",
            "Guide research for starting a new project",
            vec![
                ParamSpec::required("project_type", ParamType::String, "Kind of project being planned"),
                ParamSpec::optional("tech_stack", ParamType::String, "Technologies under consideration"),
                ParamSpec::optional("focus_area", ParamType::String, "Aspect to research most deeply"),
            ],
        ),
        prompt(
            "competitive_analysis",
            "Guide a competitive landscape analysis for a domain",
            vec![
                ParamSpec::required("domain", ParamType::String, "Product or technology domain"),
                ParamSpec::optional("timeframe", ParamType::String, "Timeframe to consider"),
                ParamSpec::optional("analysis_depth", ParamType::String, "Requested analysis depth"),
            ],
        ),
        prompt(
            "learning_roadmap",
            "Guide construction of a learning roadmap for a skill",
            vec![
                ParamSpec::required("skill_area", ParamType::String, "Skill area to learn"),
                ParamSpec::optional("experience_level", ParamType::String, "Current experience level"),
                ParamSpec::optional("learning_style", ParamType::String, "Preferred learning style"),
            ],
        ),
        prompt(
            "code_review_assistant",
            "Guide a structured code review conversation",
            vec![
                ParamSpec::optional("language", ParamType::String, "Language of the code under review"),
                ParamSpec::optional("review_focus", ParamType::String, "Focus area for the review"),
                ParamSpec::optional("project_context", ParamType::String, "Project background for the reviewer"),
            ],
        ),
    ]
}
