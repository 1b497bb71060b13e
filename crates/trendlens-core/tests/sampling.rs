// crates/trendlens-core/tests/sampling.rs
// ============================================================================
// Module: Sampling Synthesis Tests
// Description: Construction and wire-shape tests for sampling requests.
// Purpose: Ensure synthesized requests honor defaults, ranges, and omission.
// Dependencies: trendlens-core, serde_json
// ============================================================================

//! Construction behavior tests for sampling-request synthesis.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::json;
use trendlens_core::DEFAULT_PRIORITY;
use trendlens_core::IncludeContext;
use trendlens_core::MessageContent;
use trendlens_core::Priorities;
use trendlens_core::SAMPLING_METHOD;
use trendlens_core::SamplingInputs;
use trendlens_core::SamplingRequest;
use trendlens_core::build_sampling_request;

#[test]
fn unset_priorities_default_to_midpoint() {
    let mut inputs = SamplingInputs::for_prompt("Summarize the current Rust ecosystem.");
    inputs.priorities = Priorities {
        intelligence: Some(0.9),
        cost: Some(0.2),
        speed: None,
    };

    let request = build_sampling_request(&inputs).expect("request builds");
    let preferences = &request.params.model_preferences;
    assert_eq!(preferences.intelligence_priority, 0.9);
    assert_eq!(preferences.cost_priority, 0.2);
    assert_eq!(preferences.speed_priority, DEFAULT_PRIORITY);
}

#[test]
fn out_of_range_temperature_is_exactly_one_failure() {
    let mut inputs = SamplingInputs::for_prompt("Review this module.");
    inputs.temperature = 1.5;

    let failures = build_sampling_request(&inputs).expect_err("temperature is rejected");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].field, "temperature");
}

#[test]
fn all_range_violations_are_collected() {
    let mut inputs = SamplingInputs::for_prompt("  ");
    inputs.temperature = -0.1;
    inputs.max_tokens = 0;
    inputs.priorities = Priorities {
        intelligence: Some(1.2),
        cost: None,
        speed: Some(-0.5),
    };

    let failures = build_sampling_request(&inputs).expect_err("every violation is reported");
    let fields: Vec<&str> = failures.iter().map(|failure| failure.field.as_str()).collect();
    assert_eq!(failures.len(), 5);
    assert!(fields.contains(&"prompt"));
    assert!(fields.contains(&"maxTokens"));
    assert!(fields.contains(&"temperature"));
    assert!(fields.contains(&"intelligencePriority"));
    assert!(fields.contains(&"speedPriority"));
}

#[test]
fn wire_shape_uses_camel_case_and_omits_absent_fields() {
    let mut inputs = SamplingInputs::for_prompt("Describe trending repositories.");
    inputs.max_tokens = 800;
    inputs.temperature = 0.3;
    inputs.include_context = IncludeContext::ThisServer;
    inputs.server_context = Some("trend analysis server".to_string());

    let request = build_sampling_request(&inputs).expect("request builds");
    let wire = serde_json::to_value(&request).expect("request serializes");

    assert_eq!(wire["method"], SAMPLING_METHOD);
    assert_eq!(wire["params"]["maxTokens"], json!(800));
    assert_eq!(wire["params"]["includeContext"], json!("thisServer"));
    assert_eq!(wire["params"]["_meta"]["protocolVersion"], json!("2025-03-26"));
    assert_eq!(wire["params"]["_meta"]["serverContext"], json!("trend analysis server"));

    // No hint was set, so the hints key is omitted entirely.
    let preferences = wire["params"]["modelPreferences"].as_object().expect("object");
    assert!(!preferences.contains_key("hints"));
    assert_eq!(preferences["intelligencePriority"], json!(DEFAULT_PRIORITY));

    // Absent optional fields are omitted, never serialized as null.
    let content = wire["params"]["messages"][0]["content"].as_object().expect("object");
    assert!(!content.contains_key("annotations"));
}

#[test]
fn model_hint_appears_as_named_hint() {
    let mut inputs = SamplingInputs::for_prompt("Review this diff.");
    inputs.model_hint = Some("claude".to_string());

    let request = build_sampling_request(&inputs).expect("request builds");
    let hints = &request.params.model_preferences.hints;
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].name, "claude");
}

#[test]
fn context_data_is_appended_and_annotated() {
    let mut inputs = SamplingInputs::for_prompt("Analyze these stories.");
    inputs.context = Some(json!({ "stories": [{ "title": "Rust 2.0", "score": 420 }] }));

    let request = build_sampling_request(&inputs).expect("request builds");
    let MessageContent::Text {
        text,
        annotations,
    } = &request.params.messages[0].content;
    assert!(text.starts_with("Analyze these stories."));
    assert!(text.contains("Context data:"));
    assert!(text.contains("Rust 2.0"));

    let annotations = annotations.as_ref().expect("context carries annotations");
    assert_eq!(annotations.priority, 0.8);
    assert_eq!(annotations.audience, ["human", "assistant"]);
}

#[test]
fn server_context_is_dropped_outside_this_server_scope() {
    let mut inputs = SamplingInputs::for_prompt("Standalone prompt.");
    inputs.include_context = IncludeContext::None;
    inputs.server_context = Some("ignored".to_string());

    let request = build_sampling_request(&inputs).expect("request builds");
    assert_eq!(request.params.meta.server_context, None);

    let wire = serde_json::to_value(&request).expect("request serializes");
    let meta = wire["params"]["_meta"].as_object().expect("object");
    assert!(!meta.contains_key("serverContext"));
}

#[test]
fn serialized_request_round_trips() {
    let mut inputs = SamplingInputs::for_prompt("Round trip.");
    inputs.model_hint = Some("claude".to_string());
    inputs.context = Some(json!({ "repo": "tokio" }));
    inputs.server_context = Some("trend analysis server".to_string());

    let request = build_sampling_request(&inputs).expect("request builds");
    let wire = serde_json::to_string(&request).expect("request serializes");
    let decoded: SamplingRequest = serde_json::from_str(&wire).expect("request deserializes");
    assert_eq!(decoded, request);
}
