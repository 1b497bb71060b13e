// trendlens-core/src/core/validate.rs
// ============================================================================
// Module: Argument Validator
// Description: Exhaustive scalar validation against capability schemas.
// Purpose: Reject invalid arguments with a complete failure report.
// Dependencies: crate::core::capability, serde_json
// ============================================================================

//! ## Overview
//! Validation is exhaustive: the whole argument object is checked and every
//! violation is collected before the result is returned, so a caller sending
//! N invalid fields learns about all N at once. Arguments that arrive as
//! strings (resource URI parameters always do) are coerced to the declared
//! scalar type before constraint checks run.
//!
//! ## Edge Cases
//! - A non-object argument payload is a single failure on `arguments`.
//! - `null` arguments are treated as an empty object.
//! - Unknown argument keys are rejected, never silently dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::core::capability::CapabilityDescriptor;
use crate::core::capability::ParamSpec;
use crate::core::capability::ParamType;
use crate::core::capability::ValidationFailure;

// ============================================================================
// SECTION: Validated Arguments
// ============================================================================

/// Argument object with every value coerced to its declared type.
pub type ValidatedArgs = Map<String, Value>;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates raw arguments against a capability descriptor.
///
/// # Errors
///
/// Returns the complete list of validation failures: missing required
/// parameters, unknown keys, type mismatches, out-of-range numbers, and
/// values outside an allowed set.
pub fn validate(
    descriptor: &CapabilityDescriptor,
    raw: &Value,
) -> Result<ValidatedArgs, Vec<ValidationFailure>> {
    let empty = Map::new();
    let args = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(vec![ValidationFailure::new("arguments", "expected a JSON object")]);
        }
    };

    let mut failures = Vec::new();
    let mut validated = Map::new();

    for key in args.keys() {
        if !descriptor.params.iter().any(|spec| spec.name == *key) {
            failures.push(ValidationFailure::new(key, "unknown argument"));
        }
    }

    for spec in &descriptor.params {
        match args.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    failures.push(ValidationFailure::new(&spec.name, "missing required argument"));
                }
            }
            Some(value) => match coerce(spec, value) {
                Ok(coerced) => {
                    check_constraints(spec, &coerced, &mut failures);
                    validated.insert(spec.name.clone(), coerced);
                }
                Err(reason) => {
                    failures.push(ValidationFailure::new(&spec.name, reason));
                }
            },
        }
    }

    if failures.is_empty() {
        Ok(validated)
    } else {
        Err(failures)
    }
}

/// Coerces a raw value to the declared scalar type.
fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value, String> {
    match spec.param_type {
        ParamType::String => match value {
            Value::String(text) => Ok(Value::String(text.clone())),
            _ => Err("expected a string".to_string()),
        },
        ParamType::Number => match value {
            Value::Number(number) => Ok(Value::Number(number.clone())),
            Value::String(text) => parse_number(text)
                .ok_or_else(|| format!("expected a number, got \"{text}\"")),
            _ => Err("expected a number".to_string()),
        },
        ParamType::Boolean => match value {
            Value::Bool(flag) => Ok(Value::Bool(*flag)),
            Value::String(text) => match text.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("expected a boolean, got \"{text}\"")),
            },
            _ => Err("expected a boolean".to_string()),
        },
        ParamType::Object => match value {
            Value::Object(map) => Ok(Value::Object(map.clone())),
            _ => Err("expected a JSON object".to_string()),
        },
    }
}

/// Parses a numeric string, preferring integer representation.
fn parse_number(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::Number(Number::from(integer)));
    }
    let float = text.parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}

/// Checks range and allowed-value constraints on a coerced value.
fn check_constraints(spec: &ParamSpec, value: &Value, failures: &mut Vec<ValidationFailure>) {
    if let Some((min, max)) = spec.range {
        if let Some(number) = value.as_f64() {
            if number < min || number > max {
                failures.push(ValidationFailure::new(
                    &spec.name,
                    format!("value {number} outside range [{min}, {max}]"),
                ));
            }
        }
    }
    if let Some(allowed) = &spec.one_of {
        if let Some(text) = value.as_str() {
            if !allowed.iter().any(|candidate| candidate == text) {
                failures.push(ValidationFailure::new(
                    &spec.name,
                    format!("\"{text}\" is not one of: {}", allowed.join(", ")),
                ));
            }
        }
    }
}
