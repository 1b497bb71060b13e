// trendlens-mcp/src/synthetic.rs
// ============================================================================
// Module: Synthetic Samples
// Description: Numeric sample generation for the sampling resource scheme.
// Purpose: Serve random, sequential, and distribution samples without I/O.
// Dependencies: rand, serde_json
// ============================================================================

//! ## Overview
//! Synthetic samples back the `sampling://{sampling_type}/{count}` resource.
//! Three strategies are supported: uniform random values in [0, 100),
//! a sequential ramp starting at 1, and normally distributed values around
//! a fixed mean. Generation is pure computation and never touches a source
//! adapter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound (exclusive) for uniform random samples.
const RANDOM_UPPER: f64 = 100.0;
/// Mean of the normal distribution strategy.
const DISTRIBUTION_MEAN: f64 = 50.0;
/// Standard deviation of the normal distribution strategy.
const DISTRIBUTION_STDDEV: f64 = 15.0;

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Supported sample generation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Uniform random values in [0, 100).
    Random,
    /// Sequential integers starting at 1.
    Sequential,
    /// Normally distributed values around a fixed mean.
    Distribution,
}

impl SamplingStrategy {
    /// Parses a strategy label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "random" => Some(Self::Random),
            "sequential" => Some(Self::Sequential),
            "distribution" => Some(Self::Distribution),
            _ => None,
        }
    }

    /// Returns the stable label for the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sequential => "sequential",
            Self::Distribution => "distribution",
        }
    }
}

/// Generates a sample payload for the given strategy and count.
#[must_use]
pub fn generate(strategy: SamplingStrategy, count: usize) -> Value {
    let samples = match strategy {
        SamplingStrategy::Random => random_samples(count),
        SamplingStrategy::Sequential => sequential_samples(count),
        SamplingStrategy::Distribution => distribution_samples(count),
    };
    json!({
        "sampling_type": strategy.as_str(),
        "count": samples.len(),
        "samples": samples,
    })
}

/// Uniform random samples in [0, 100), rounded to two decimals.
fn random_samples(count: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| json!(round2(rng.gen_range(0.0..RANDOM_UPPER)))).collect()
}

/// Sequential integer samples starting at 1.
fn sequential_samples(count: usize) -> Vec<Value> {
    (1..=count).map(|n| json!(n)).collect()
}

/// Normally distributed samples via the Box-Muller transform.
fn distribution_samples(count: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let normal = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            json!(round2(DISTRIBUTION_STDDEV.mul_add(normal, DISTRIBUTION_MEAN)))
        })
        .collect()
}

/// Rounds a value to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// SECTION: Tests
// ============================================================================
