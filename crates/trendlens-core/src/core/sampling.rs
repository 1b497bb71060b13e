// trendlens-core/src/core/sampling.rs
// ============================================================================
// Module: Sampling Request Synthesis
// Description: Pure construction of client-directed sampling requests.
// Purpose: Build validated `sampling/createMessage` payloads.
// Dependencies: crate::core::capability, serde, serde_json
// ============================================================================

//! ## Overview
//! Sampling-request synthesis is pure construction: no model is invoked and
//! no I/O happens here. Inputs are validated exhaustively, then assembled
//! into an inert request value the client executes on its own model.
//!
//! ## Invariants
//! - Unset model priorities default to [`DEFAULT_PRIORITY`], never to zero.
//! - Absent optional fields are omitted from the wire form, never `null`.
//! - `maxTokens` stays within `[1, MAX_TOKENS_CEILING]` and `temperature`
//!   within `[0.0, 1.0]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::capability::ValidationFailure;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC method name for client-directed sampling.
pub const SAMPLING_METHOD: &str = "sampling/createMessage";

/// Protocol revision stamped into request metadata.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Upper bound on the `maxTokens` budget.
pub const MAX_TOKENS_CEILING: u32 = 4000;

/// Priority used when a model preference axis is left unset.
pub const DEFAULT_PRIORITY: f64 = 0.5;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Conversation role of a sampling message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message authored by the user.
    User,
    /// Message authored by the assistant.
    Assistant,
}

/// Display annotations attached to message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Intended audiences for the content.
    pub audience: Vec<String>,
    /// Relative priority of the content in `[0.0, 1.0]`.
    pub priority: f64,
}

/// Typed content block within a sampling message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    /// Plain-text content block.
    Text {
        /// Text payload.
        text: String,
        /// Optional display annotations.
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Annotations>,
    },
}

/// Single message within a sampling conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Message content block.
    pub content: MessageContent,
}

// ============================================================================
// SECTION: Model Preferences
// ============================================================================

/// Named model hint advising the client's model selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHint {
    /// Suggested model name or family.
    pub name: String,
}

/// Model selection preferences across the three priority axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPreferences {
    /// Ordered model hints, strongest first.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hints: Vec<ModelHint>,
    /// Weight placed on model capability, in `[0.0, 1.0]`.
    pub intelligence_priority: f64,
    /// Weight placed on cost, in `[0.0, 1.0]`.
    pub cost_priority: f64,
    /// Weight placed on latency, in `[0.0, 1.0]`.
    pub speed_priority: f64,
}

/// Caller-supplied priority overrides, unset axes default later.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Priorities {
    /// Override for the intelligence axis.
    pub intelligence: Option<f64>,
    /// Override for the cost axis.
    pub cost: Option<f64>,
    /// Override for the speed axis.
    pub speed: Option<f64>,
}

/// Scope of server context the client should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeContext {
    /// Include no server context.
    #[serde(rename = "none")]
    None,
    /// Include context from the requesting server only.
    #[serde(rename = "thisServer")]
    ThisServer,
    /// Include context from every connected server.
    #[serde(rename = "allServers")]
    AllServers,
}

// ============================================================================
// SECTION: Request Envelope
// ============================================================================

/// Request metadata carried under the `_meta` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingMeta {
    /// Protocol revision the request was built for.
    pub protocol_version: String,
    /// Description of the server context included with the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_context: Option<String>,
}

/// Parameters of a `sampling/createMessage` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingParams {
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Token budget for the completion.
    pub max_tokens: u32,
    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f64,
    /// Model selection preferences.
    pub model_preferences: ModelPreferences,
    /// Scope of server context to include.
    pub include_context: IncludeContext,
    /// Request metadata.
    #[serde(rename = "_meta")]
    pub meta: SamplingMeta,
}

/// Complete client-directed sampling request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingRequest {
    /// JSON-RPC method, always [`SAMPLING_METHOD`].
    pub method: String,
    /// Request parameters.
    pub params: SamplingParams,
}

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Validated inputs for sampling-request synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingInputs {
    /// Prompt text for the user message.
    pub prompt: String,
    /// Optional model hint name.
    pub model_hint: Option<String>,
    /// Priority overrides for model selection.
    pub priorities: Priorities,
    /// Structured context data appended to the prompt.
    pub context: Option<Value>,
    /// Token budget for the completion.
    pub max_tokens: u32,
    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f64,
    /// Scope of server context to include.
    pub include_context: IncludeContext,
    /// Description of the serving context, stamped into `_meta`.
    pub server_context: Option<String>,
}

impl SamplingInputs {
    /// Creates inputs with conventional defaults for a prompt.
    #[must_use]
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_hint: None,
            priorities: Priorities::default(),
            context: None,
            max_tokens: 1000,
            temperature: 0.7,
            include_context: IncludeContext::ThisServer,
            server_context: None,
        }
    }
}

/// Builds a sampling request from validated inputs.
///
/// # Errors
///
/// Returns the complete list of range violations: empty prompt, token budget
/// outside `[1, MAX_TOKENS_CEILING]`, temperature outside `[0.0, 1.0]`, and
/// any set priority outside `[0.0, 1.0]`.
pub fn build_sampling_request(
    inputs: &SamplingInputs,
) -> Result<SamplingRequest, Vec<ValidationFailure>> {
    let mut failures = Vec::new();
    if inputs.prompt.trim().is_empty() {
        failures.push(ValidationFailure::new("prompt", "prompt must not be empty"));
    }
    if inputs.max_tokens < 1 || inputs.max_tokens > MAX_TOKENS_CEILING {
        failures.push(ValidationFailure::new(
            "maxTokens",
            format!("value {} outside range [1, {MAX_TOKENS_CEILING}]", inputs.max_tokens),
        ));
    }
    if !(0.0..=1.0).contains(&inputs.temperature) {
        failures.push(ValidationFailure::new(
            "temperature",
            format!("value {} outside range [0.0, 1.0]", inputs.temperature),
        ));
    }
    check_priority(&mut failures, "intelligencePriority", inputs.priorities.intelligence);
    check_priority(&mut failures, "costPriority", inputs.priorities.cost);
    check_priority(&mut failures, "speedPriority", inputs.priorities.speed);
    if !failures.is_empty() {
        return Err(failures);
    }

    let (text, annotations) = match &inputs.context {
        Some(context) => {
            let rendered = serde_json::to_string_pretty(context)
                .unwrap_or_else(|_| context.to_string());
            (
                format!("{}\n\nContext data: {rendered}", inputs.prompt),
                Some(Annotations {
                    audience: vec!["human".to_string(), "assistant".to_string()],
                    priority: 0.8,
                }),
            )
        }
        None => (inputs.prompt.clone(), None),
    };

    let hints = inputs
        .model_hint
        .iter()
        .map(|name| ModelHint {
            name: name.clone(),
        })
        .collect();

    let server_context = match inputs.include_context {
        IncludeContext::ThisServer => inputs.server_context.clone(),
        IncludeContext::None | IncludeContext::AllServers => None,
    };

    Ok(SamplingRequest {
        method: SAMPLING_METHOD.to_string(),
        params: SamplingParams {
            messages: vec![Message {
                role: Role::User,
                content: MessageContent::Text {
                    text,
                    annotations,
                },
            }],
            max_tokens: inputs.max_tokens,
            temperature: inputs.temperature,
            model_preferences: ModelPreferences {
                hints,
                intelligence_priority: inputs.priorities.intelligence.unwrap_or(DEFAULT_PRIORITY),
                cost_priority: inputs.priorities.cost.unwrap_or(DEFAULT_PRIORITY),
                speed_priority: inputs.priorities.speed.unwrap_or(DEFAULT_PRIORITY),
            },
            include_context: inputs.include_context,
            meta: SamplingMeta {
                protocol_version: PROTOCOL_VERSION.to_string(),
                server_context,
            },
        },
    })
}

/// Records a failure when a set priority falls outside `[0.0, 1.0]`.
fn check_priority(failures: &mut Vec<ValidationFailure>, field: &str, value: Option<f64>) {
    if let Some(priority) = value {
        if !(0.0..=1.0).contains(&priority) {
            failures.push(ValidationFailure::new(
                field,
                format!("value {priority} outside range [0.0, 1.0]"),
            ));
        }
    }
}
