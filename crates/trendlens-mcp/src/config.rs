// trendlens-mcp/src/config.rs
// ============================================================================
// Module: Trendlens Configuration
// Description: Configuration loading and validation for the Trendlens server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, trendlens-sources
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file. Every section has conservative
//! defaults so an empty file yields a working stdio server; invalid values
//! fail closed at startup rather than surfacing at request time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use trendlens_sources::HttpSourceConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default configuration file name.
const DEFAULT_CONFIG_PATH: &str = "trendlens.toml";
/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "TRENDLENS_CONFIG";
/// Default maximum JSON-RPC request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default aggregation deadline in milliseconds.
const DEFAULT_DEADLINE_MS: u64 = 5_000;
/// Maximum allowed aggregation deadline in milliseconds.
const MAX_DEADLINE_MS: u64 = 60_000;
/// Default per-attempt source timeout in milliseconds.
const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 10_000;
/// Default retry budget for transient source failures.
const DEFAULT_SOURCE_RETRIES: u32 = 2;
/// Default per-source concurrency cap.
const DEFAULT_SOURCE_CONCURRENCY: usize = 8;
/// Maximum allowed per-source concurrency cap.
const MAX_SOURCE_CONCURRENCY: usize = 64;
/// Default token budget for synthesized sampling requests.
const DEFAULT_SAMPLING_MAX_TOKENS: u32 = 1_000;
/// Default temperature for synthesized sampling requests.
const DEFAULT_SAMPLING_TEMPERATURE: f64 = 0.7;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Trendlens MCP server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrendlensConfig {
    /// Server transport configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Context aggregation configuration.
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// External source configuration.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Sampling synthesis defaults.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Transport the server listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// JSON-RPC over framed stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST.
    Http,
}

/// Server transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport used for requests.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address, required for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum allowed request body size.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Context aggregation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Shared deadline for one aggregation batch, in milliseconds.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

/// One external source section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Whether the source adapter is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL override; the adapter default applies when empty.
    #[serde(default)]
    pub base_url: String,
    /// Per-attempt request timeout in milliseconds.
    #[serde(default = "default_source_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry budget for transient failures.
    #[serde(default = "default_source_retries")]
    pub max_retries: u32,
    /// Maximum concurrent in-flight requests.
    #[serde(default = "default_source_concurrency")]
    pub max_concurrency: usize,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::new(),
            timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            max_retries: DEFAULT_SOURCE_RETRIES,
            max_concurrency: DEFAULT_SOURCE_CONCURRENCY,
        }
    }
}

impl SourceSection {
    /// Converts the section into adapter HTTP configuration.
    #[must_use]
    pub fn to_http_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            max_concurrency: self.max_concurrency,
            ..HttpSourceConfig::default()
        }
    }

    /// Validates one source section under its config key.
    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(format!("sources.{key}.timeout_ms must be nonzero")));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_SOURCE_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "sources.{key}.max_concurrency must be in [1, {MAX_SOURCE_CONCURRENCY}]"
            )));
        }
        Ok(())
    }
}

/// External source configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SourcesConfig {
    /// Hacker News adapter configuration.
    #[serde(default)]
    pub hackernews: SourceSection,
    /// GitHub adapter configuration.
    #[serde(default)]
    pub github: SourceSection,
}

/// Sampling synthesis defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Default token budget when a caller does not set one.
    #[serde(default = "default_sampling_max_tokens")]
    pub default_max_tokens: u32,
    /// Default temperature when a caller does not set one.
    #[serde(default = "default_sampling_temperature")]
    pub default_temperature: f64,
    /// Server context description stamped into request metadata.
    #[serde(default = "default_server_context")]
    pub server_context: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: DEFAULT_SAMPLING_MAX_TOKENS,
            default_temperature: DEFAULT_SAMPLING_TEMPERATURE,
            server_context: default_server_context(),
        }
    }
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl TrendlensConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self =
            toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves and loads configuration for the server binary.
    ///
    /// Resolution order: explicit path, `TRENDLENS_CONFIG`, then
    /// `trendlens.toml` in the working directory. Built-in defaults apply
    /// when no file is found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a resolved file cannot be loaded or
    /// fails validation.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(explicit) = path {
            return Self::load(explicit);
        }
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(Path::new(&env_path));
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load(default);
        }
        Ok(Self::default())
    }

    /// Validates every configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.transport == ServerTransport::Http {
            let bind = self.server.bind.as_deref().ok_or_else(|| {
                ConfigError::Invalid("server.bind is required for the http transport".to_string())
            })?;
            bind.parse::<SocketAddr>().map_err(|_| {
                ConfigError::Invalid("server.bind is not a valid socket address".to_string())
            })?;
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_body_bytes must be nonzero".to_string()));
        }
        if self.aggregation.deadline_ms == 0 || self.aggregation.deadline_ms > MAX_DEADLINE_MS {
            return Err(ConfigError::Invalid(format!(
                "aggregation.deadline_ms must be in [1, {MAX_DEADLINE_MS}]"
            )));
        }
        self.sources.hackernews.validate("hackernews")?;
        self.sources.github.validate("github")?;
        if self.sampling.default_max_tokens == 0
            || self.sampling.default_max_tokens > trendlens_core::MAX_TOKENS_CEILING
        {
            return Err(ConfigError::Invalid(format!(
                "sampling.default_max_tokens must be in [1, {}]",
                trendlens_core::MAX_TOKENS_CEILING
            )));
        }
        if !(0.0..=1.0).contains(&self.sampling.default_temperature) {
            return Err(ConfigError::Invalid(
                "sampling.default_temperature must be in [0.0, 1.0]".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default for boolean flags that are enabled unless disabled.
const fn default_true() -> bool {
    true
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default aggregation deadline.
const fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE_MS
}

/// Default source timeout.
const fn default_source_timeout_ms() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_MS
}

/// Default source retry budget.
const fn default_source_retries() -> u32 {
    DEFAULT_SOURCE_RETRIES
}

/// Default source concurrency cap.
const fn default_source_concurrency() -> usize {
    DEFAULT_SOURCE_CONCURRENCY
}

/// Default sampling token budget.
const fn default_sampling_max_tokens() -> u32 {
    DEFAULT_SAMPLING_MAX_TOKENS
}

/// Default sampling temperature.
const fn default_sampling_temperature() -> f64 {
    DEFAULT_SAMPLING_TEMPERATURE
}

/// Default server context description.
fn default_server_context() -> String {
    "trendlens technology trend analysis server".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A config value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}
