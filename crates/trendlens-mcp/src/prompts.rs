// trendlens-mcp/src/prompts.rs
// ============================================================================
// Module: Prompt Templates
// Description: Renderers for every registered prompt.
// Purpose: Turn validated prompt arguments into instruction messages.
// Dependencies: trendlens-core, serde_json
// ============================================================================

//! ## Overview
//! Prompt rendering is pure string assembly over validated arguments.
//! Every renderer produces the same shape: a description plus one user
//! message whose text carries the full instruction. Optional arguments fall
//! back to conventional defaults rather than leaving holes in the text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use trendlens_core::CapabilityError;
use trendlens_core::ValidatedArgs;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Renders a validated prompt call.
///
/// # Errors
///
/// Returns [`CapabilityError::NotFound`] for unknown prompt names and
/// [`CapabilityError::Internal`] when the rendered payload cannot be
/// serialized.
pub(crate) fn render(name: &str, args: &ValidatedArgs) -> Result<Value, CapabilityError> {
    let (description, text) = match name {
        "analyze_tech_trends" => analyze_tech_trends(args),
        "project_research" => project_research(args),
        "competitive_analysis" => competitive_analysis(args),
        "learning_roadmap" => learning_roadmap(args),
        "code_review_assistant" => code_review_assistant(args),
        other => return Err(CapabilityError::NotFound(format!("prompt: {other}"))),
    };
    Ok(json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text },
        }],
    }))
}

// ============================================================================
// SECTION: Renderers
// ============================================================================

/// Trend analysis guidance for a technology area.
fn analyze_tech_trends(args: &ValidatedArgs) -> (String, String) {
    let area = str_arg(args, "technology_area", "technology");
    let period = str_arg(args, "time_period", "the past month");
    let detail = str_arg(args, "detail_level", "overview");
    (
        format!("Technology trend analysis for {area}"),
        format!(
            "Analyze current trends in {area} over {period}. Provide an \
             {detail}-level treatment covering: the most significant \
             developments and announcements, shifts in community attention, \
             notable new projects or releases, and where momentum appears to \
             be heading next. Cite the specific signals behind each claim."
        ),
    )
}

/// Research guidance for starting a new project.
fn project_research(args: &ValidatedArgs) -> (String, String) {
    let project = str_arg(args, "project_type", "software project");
    let stack = str_arg(args, "tech_stack", "a suitable technology stack");
    let focus = str_arg(args, "focus_area", "overall feasibility");
    (
        format!("Project research for a {project}"),
        format!(
            "Research what is needed to start a {project} using {stack}. \
             Focus most deeply on {focus}. Cover: comparable existing \
             projects and what they got right, the maturity of the relevant \
             libraries, common pitfalls reported by practitioners, and a \
             recommended starting architecture with its trade-offs."
        ),
    )
}

/// Competitive landscape guidance for a domain.
fn competitive_analysis(args: &ValidatedArgs) -> (String, String) {
    let domain = str_arg(args, "domain", "the domain");
    let timeframe = str_arg(args, "timeframe", "the past year");
    let depth = str_arg(args, "analysis_depth", "standard");
    (
        format!("Competitive analysis of {domain}"),
        format!(
            "Produce a {depth} competitive analysis of {domain} covering \
             {timeframe}. Identify the leading players and their positioning, \
             recent moves that changed the landscape, underserved niches, \
             and the barriers a new entrant would face. Close with the three \
             most defensible opportunities you see."
        ),
    )
}

/// Learning roadmap guidance for a skill area.
fn learning_roadmap(args: &ValidatedArgs) -> (String, String) {
    let skill = str_arg(args, "skill_area", "the skill");
    let level = str_arg(args, "experience_level", "beginner");
    let style = str_arg(args, "learning_style", "mixed reading and practice");
    (
        format!("Learning roadmap for {skill}"),
        format!(
            "Build a learning roadmap for {skill}, starting from a {level} \
             level and favoring {style}. Break the path into ordered stages \
             with a concrete goal, recommended resources, and a small \
             project for each stage. Flag the concepts learners most often \
             get stuck on and how to get past them."
        ),
    )
}

/// Structured code review guidance.
fn code_review_assistant(args: &ValidatedArgs) -> (String, String) {
    let language = str_arg(args, "language", "the code's language");
    let focus = str_arg(args, "review_focus", "general quality");
    let context = str_arg(args, "project_context", "no additional project context");
    (
        "Structured code review assistant".to_string(),
        format!(
            "Act as a code reviewer for {language} with a focus on {focus}. \
             Project background: {context}. For the code I share next, work \
             through correctness, readability, and idiomatic style in that \
             order; for every finding give the concrete change you would \
             make and why it matters. End with a short summary ranking the \
             findings by impact."
        ),
    )
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a string argument with a rendering default.
fn str_arg<'a>(args: &'a ValidatedArgs, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
