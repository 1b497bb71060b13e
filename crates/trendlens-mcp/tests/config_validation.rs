// trendlens-mcp/tests/config_validation.rs
// ============================================================================
// Module: Configuration Tests
// Description: Loading and validation behavior for server configuration.
// Purpose: Verify fail-closed parsing and the resolution order contract.
// Dependencies: tempfile, trendlens-mcp
// ============================================================================

//! Integration tests for configuration loading and validation.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test assertions."
)]

use std::io::Write;

use tempfile::NamedTempFile;
use trendlens_mcp::ConfigError;
use trendlens_mcp::TrendlensConfig;
use trendlens_mcp::config::ServerTransport;

/// Writes TOML content to a temporary config file.
fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn empty_file_yields_stdio_defaults() {
    let file = config_file("");
    let config = TrendlensConfig::load(file.path()).unwrap();
    assert_eq!(config.server.transport, ServerTransport::Stdio);
    assert_eq!(config.aggregation.deadline_ms, 5_000);
    assert!(config.sources.hackernews.enabled);
    assert!(config.sources.github.enabled);
    assert_eq!(config.sampling.default_max_tokens, 1_000);
}

#[test]
fn explicit_path_resolves_the_given_file() {
    let file = config_file("[aggregation]\ndeadline_ms = 250\n");
    let config = TrendlensConfig::resolve(Some(file.path())).unwrap();
    assert_eq!(config.aggregation.deadline_ms, 250);
}

#[test]
fn http_transport_requires_a_bind_address() {
    let file = config_file("[server]\ntransport = \"http\"\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(message) if message.contains("server.bind")));
}

#[test]
fn http_transport_rejects_malformed_bind_addresses() {
    let file = config_file("[server]\ntransport = \"http\"\nbind = \"not-an-address\"\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(message) if message.contains("socket address")));
}

#[test]
fn http_transport_accepts_a_valid_bind_address() {
    let file = config_file("[server]\ntransport = \"http\"\nbind = \"127.0.0.1:8087\"\n");
    let config = TrendlensConfig::load(file.path()).unwrap();
    assert_eq!(config.server.transport, ServerTransport::Http);
    assert_eq!(config.server.bind.as_deref(), Some("127.0.0.1:8087"));
}

#[test]
fn zero_deadline_is_rejected() {
    let file = config_file("[aggregation]\ndeadline_ms = 0\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(message) if message.contains("deadline_ms")));
}

#[test]
fn oversized_deadline_is_rejected() {
    let file = config_file("[aggregation]\ndeadline_ms = 600000\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(message) if message.contains("deadline_ms")));
}

#[test]
fn out_of_range_temperature_is_rejected() {
    let file = config_file("[sampling]\ndefault_temperature = 1.5\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(
        error,
        ConfigError::Invalid(message) if message.contains("default_temperature")
    ));
}

#[test]
fn oversized_token_default_is_rejected() {
    let file = config_file("[sampling]\ndefault_max_tokens = 100000\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(
        error,
        ConfigError::Invalid(message) if message.contains("default_max_tokens")
    ));
}

#[test]
fn zero_source_concurrency_is_rejected() {
    let file = config_file("[sources.github]\nmax_concurrency = 0\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(
        error,
        ConfigError::Invalid(message) if message.contains("sources.github.max_concurrency")
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = config_file("[server\ntransport = \"stdio\"\n");
    let error = TrendlensConfig::load(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let error = TrendlensConfig::load(std::path::Path::new("/nonexistent/trendlens.toml"))
        .unwrap_err();
    assert!(matches!(error, ConfigError::Io(_)));
}
