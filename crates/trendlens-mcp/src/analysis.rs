// trendlens-mcp/src/analysis.rs
// ============================================================================
// Module: Analysis Synthesis
// Description: Builds sampling-request envelopes from aggregated context.
// Purpose: Turn source data into client-ready analysis sampling requests.
// Dependencies: crate::config, trendlens-core, serde_json
// ============================================================================

//! ## Overview
//! Analysis handlers do not run a model. They assemble a prompt from
//! aggregated source context, synthesize a sampling request through the
//! core builder, and wrap it in an envelope the client can dispatch to its
//! own provider. The envelope carries a `ready_for_client` status so callers
//! can distinguish inert request descriptions from executed results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use trendlens_core::AggregatedContext;
use trendlens_core::CapabilityError;
use trendlens_core::IncludeContext;
use trendlens_core::MAX_TOKENS_CEILING;
use trendlens_core::ModelPreferences;
use trendlens_core::Priorities;
use trendlens_core::SamplingInputs;
use trendlens_core::SamplingRequest;
use trendlens_core::build_sampling_request;

use crate::config::SamplingConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Envelope status marking the request as inert and caller-dispatched.
const READY_STATUS: &str = "ready_for_client";
/// Model hint attached to synthesized analysis requests.
const ANALYSIS_MODEL_HINT: &str = "claude-3-sonnet";
/// Intelligence priority for synthesized analysis requests.
const ANALYSIS_INTELLIGENCE_PRIORITY: f64 = 0.9;
/// Cost priority for synthesized analysis requests.
const ANALYSIS_COST_PRIORITY: f64 = 0.2;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Client-ready sampling request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct SamplingEnvelope {
    /// The synthesized sampling request.
    pub sampling_request: SamplingRequest,
    /// Always `ready_for_client`; the server never executes the request.
    pub status: &'static str,
    /// Human-readable summary of what the request asks for.
    pub description: String,
    /// Convenience copy of the request's model preferences.
    pub model_preferences: ModelPreferences,
}

impl SamplingEnvelope {
    /// Wraps a synthesized request with its summary.
    fn wrap(sampling_request: SamplingRequest, description: String) -> Self {
        let model_preferences = sampling_request.params.model_preferences.clone();
        Self {
            sampling_request,
            status: READY_STATUS,
            description,
            model_preferences,
        }
    }
}

// ============================================================================
// SECTION: Analysis Parameters
// ============================================================================

/// Requested depth for trend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisDepth {
    /// Short summary of the dominant themes.
    Brief,
    /// Themed breakdown with supporting stories.
    Detailed,
    /// Full analysis with themes, patterns, and outlook.
    #[default]
    Comprehensive,
}

impl AnalysisDepth {
    /// Parses a depth label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "brief" => Some(Self::Brief),
            "detailed" => Some(Self::Detailed),
            "comprehensive" => Some(Self::Comprehensive),
            _ => None,
        }
    }

    /// Returns the stable label for the depth.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Scales the configured token budget to the requested depth.
    const fn token_budget(self, base: u32) -> u32 {
        match self {
            Self::Brief => {
                let halved = base / 2;
                if halved == 0 { 1 } else { halved }
            }
            Self::Detailed => base,
            Self::Comprehensive => {
                let doubled = base.saturating_mul(2);
                if doubled > MAX_TOKENS_CEILING { MAX_TOKENS_CEILING } else { doubled }
            }
        }
    }
}

/// Requested focus for a code review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFocus {
    /// Vulnerabilities and unsafe handling of inputs.
    Security,
    /// Hot paths, allocation, and algorithmic cost.
    Performance,
    /// Module boundaries and dependency structure.
    Architecture,
    /// Overall code quality.
    #[default]
    General,
}

impl ReviewFocus {
    /// Parses a focus label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "security" => Some(Self::Security),
            "performance" => Some(Self::Performance),
            "architecture" => Some(Self::Architecture),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Returns the stable label for the focus.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Architecture => "architecture",
            Self::General => "general",
        }
    }

    /// Returns reviewer guidance text for the focus.
    const fn guidance(self) -> &'static str {
        match self {
            Self::Security => "Concentrate on vulnerabilities, input handling, and dependency risk.",
            Self::Performance => "Concentrate on hot paths, allocation patterns, and algorithmic cost.",
            Self::Architecture => "Concentrate on module boundaries, coupling, and dependency direction.",
            Self::General => "Cover code quality, maintainability, and idiomatic style broadly.",
        }
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Caller-shaped inputs for a direct sampling request.
#[derive(Debug, Clone, Default)]
pub struct DirectRequest {
    /// Prompt text for the user message.
    pub prompt: String,
    /// Structured context appended to the prompt.
    pub context_data: Option<Value>,
    /// Token budget override.
    pub max_tokens: Option<u32>,
    /// Temperature override.
    pub temperature: Option<f64>,
    /// Suggested model name or family.
    pub model_hint: Option<String>,
    /// Priority overrides for model selection.
    pub priorities: Priorities,
}

/// Builds a sampling envelope directly from caller-supplied inputs.
///
/// # Errors
///
/// Returns [`CapabilityError::ValidationFailed`] listing every range
/// violation in the inputs.
pub fn direct_request(
    request: DirectRequest,
    sampling: &SamplingConfig,
) -> Result<SamplingEnvelope, CapabilityError> {
    let inputs = SamplingInputs {
        prompt: request.prompt,
        model_hint: request.model_hint,
        priorities: request.priorities,
        context: request.context_data,
        max_tokens: request.max_tokens.unwrap_or(sampling.default_max_tokens),
        temperature: request.temperature.unwrap_or(sampling.default_temperature),
        include_context: IncludeContext::ThisServer,
        server_context: Some(sampling.server_context.clone()),
    };
    let built = build_sampling_request(&inputs).map_err(CapabilityError::ValidationFailed)?;
    Ok(SamplingEnvelope::wrap(
        built,
        "Sampling request constructed from caller-supplied prompt".to_string(),
    ))
}

/// Builds a trend-analysis envelope from aggregated Hacker News context.
///
/// # Errors
///
/// Returns [`CapabilityError::ValidationFailed`] when synthesis inputs fall
/// outside their ranges.
pub fn trend_analysis(
    topic: &str,
    count: usize,
    depth: AnalysisDepth,
    context: &AggregatedContext,
    sampling: &SamplingConfig,
) -> Result<SamplingEnvelope, CapabilityError> {
    let prompt = format!(
        "Analyze the following {count} Hacker News stories about \"{topic}\". \
         Provide a {} analysis covering the dominant themes, notable \
         discussions, and emerging patterns in this area.",
        depth.as_str()
    );
    let inputs = SamplingInputs {
        context: Some(context_payload(context)?),
        model_hint: Some(ANALYSIS_MODEL_HINT.to_string()),
        priorities: analysis_priorities(),
        max_tokens: depth.token_budget(sampling.default_max_tokens),
        temperature: sampling.default_temperature,
        server_context: Some(sampling.server_context.clone()),
        ..SamplingInputs::for_prompt(prompt)
    };
    let built = build_sampling_request(&inputs).map_err(CapabilityError::ValidationFailed)?;
    Ok(SamplingEnvelope::wrap(
        built,
        format!("{} trend analysis of {count} stories about \"{topic}\"", depth.as_str()),
    ))
}

/// Builds a code-review envelope from aggregated repository context.
///
/// # Errors
///
/// Returns [`CapabilityError::ValidationFailed`] when synthesis inputs fall
/// outside their ranges.
pub fn code_review(
    owner: &str,
    repo: &str,
    focus: ReviewFocus,
    context: &AggregatedContext,
    sampling: &SamplingConfig,
) -> Result<SamplingEnvelope, CapabilityError> {
    let prompt = format!(
        "Review the repository {owner}/{repo} using the metadata below. \
         Focus area: {}. {}",
        focus.as_str(),
        focus.guidance()
    );
    let inputs = SamplingInputs {
        context: Some(context_payload(context)?),
        model_hint: Some(ANALYSIS_MODEL_HINT.to_string()),
        priorities: analysis_priorities(),
        max_tokens: sampling.default_max_tokens,
        temperature: sampling.default_temperature,
        server_context: Some(sampling.server_context.clone()),
        ..SamplingInputs::for_prompt(prompt)
    };
    let built = build_sampling_request(&inputs).map_err(CapabilityError::ValidationFailed)?;
    Ok(SamplingEnvelope::wrap(
        built,
        format!("{} code review request for {owner}/{repo}", focus.as_str()),
    ))
}

/// Builds a multi-source trend envelope from both sources' context.
///
/// # Errors
///
/// Returns [`CapabilityError::ValidationFailed`] when synthesis inputs fall
/// outside their ranges.
pub fn multi_source_trends(
    query: &str,
    language: &str,
    context: &AggregatedContext,
    sampling: &SamplingConfig,
) -> Result<SamplingEnvelope, CapabilityError> {
    let prompt = format!(
        "Analyze current technology trends around \"{query}\" using the data \
         below. It combines Hacker News discussion and {language} repository \
         activity; note where the two sources agree, where they diverge, and \
         which source data was unavailable."
    );
    let inputs = SamplingInputs {
        context: Some(context_payload(context)?),
        model_hint: Some(ANALYSIS_MODEL_HINT.to_string()),
        priorities: analysis_priorities(),
        max_tokens: sampling.default_max_tokens,
        temperature: sampling.default_temperature,
        server_context: Some(sampling.server_context.clone()),
        ..SamplingInputs::for_prompt(prompt)
    };
    let built = build_sampling_request(&inputs).map_err(CapabilityError::ValidationFailed)?;
    Ok(SamplingEnvelope::wrap(
        built,
        format!("multi-source trend analysis for \"{query}\" and {language} repositories"),
    ))
}

/// Fixed priorities for synthesized analysis requests.
const fn analysis_priorities() -> Priorities {
    Priorities {
        intelligence: Some(ANALYSIS_INTELLIGENCE_PRIORITY),
        cost: Some(ANALYSIS_COST_PRIORITY),
        speed: None,
    }
}

/// Serializes aggregated context for the request payload.
fn context_payload(context: &AggregatedContext) -> Result<Value, CapabilityError> {
    serde_json::to_value(context).map_err(|err| CapabilityError::Internal(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic, reason = "Test assertions.")]
    #![allow(clippy::float_cmp, reason = "Asserting exact constant propagation.")]

    use trendlens_core::MessageContent;

    use super::*;

    #[test]
    fn analysis_envelopes_carry_fixed_preferences() {
        let envelope = trend_analysis(
            "rust",
            5,
            AnalysisDepth::Comprehensive,
            &AggregatedContext::default(),
            &SamplingConfig::default(),
        )
        .unwrap();
        assert_eq!(envelope.status, "ready_for_client");
        let preferences = &envelope.sampling_request.params.model_preferences;
        assert_eq!(preferences.hints[0].name, ANALYSIS_MODEL_HINT);
        assert_eq!(preferences.intelligence_priority, ANALYSIS_INTELLIGENCE_PRIORITY);
        assert_eq!(preferences.cost_priority, ANALYSIS_COST_PRIORITY);
        assert_eq!(preferences.speed_priority, 0.5);
        assert_eq!(envelope.model_preferences, *preferences);
    }

    #[test]
    fn depth_scales_the_token_budget() {
        let sampling = SamplingConfig::default();
        let brief = trend_analysis(
            "ai",
            3,
            AnalysisDepth::Brief,
            &AggregatedContext::default(),
            &sampling,
        )
        .unwrap();
        let comprehensive = trend_analysis(
            "ai",
            3,
            AnalysisDepth::Comprehensive,
            &AggregatedContext::default(),
            &sampling,
        )
        .unwrap();
        assert_eq!(brief.sampling_request.params.max_tokens, sampling.default_max_tokens / 2);
        assert_eq!(
            comprehensive.sampling_request.params.max_tokens,
            sampling.default_max_tokens * 2
        );
    }

    #[test]
    fn review_prompt_names_the_repository_and_focus() {
        let envelope = code_review(
            "rust-lang",
            "cargo",
            ReviewFocus::Security,
            &AggregatedContext::default(),
            &SamplingConfig::default(),
        )
        .unwrap();
        let MessageContent::Text {
            text, ..
        } = &envelope.sampling_request.params.messages[0].content;
        assert!(text.contains("rust-lang/cargo"));
        assert!(text.contains("security"));
    }

    #[test]
    fn direct_request_rejects_out_of_range_inputs() {
        let error = direct_request(
            DirectRequest {
                prompt: "hello".to_string(),
                temperature: Some(1.5),
                ..DirectRequest::default()
            },
            &SamplingConfig::default(),
        )
        .unwrap_err();
        match error {
            CapabilityError::ValidationFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].field, "temperature");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(AnalysisDepth::parse("full"), None);
        assert_eq!(ReviewFocus::parse("style"), None);
        assert_eq!(AnalysisDepth::parse("brief"), Some(AnalysisDepth::Brief));
        assert_eq!(ReviewFocus::parse("general"), Some(ReviewFocus::General));
    }
}
