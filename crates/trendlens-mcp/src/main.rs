// trendlens-mcp/src/main.rs
// ============================================================================
// Module: Trendlens Entry Point
// Description: Command dispatcher for the Trendlens MCP server.
// Purpose: Start the server or validate configuration from the CLI.
// Dependencies: clap, tokio, trendlens-mcp
// ============================================================================

//! ## Overview
//! The binary wraps the library server behind a small CLI: `serve` starts
//! the configured transport and `config validate` checks a configuration
//! file without starting anything. Configuration resolution order is the
//! explicit `--config` path, the `TRENDLENS_CONFIG` environment variable,
//! then `trendlens.toml` in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use trendlens_mcp::McpServer;
use trendlens_mcp::TrendlensConfig;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "trendlens", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Trendlens MCP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to trendlens.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Trendlens configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to trendlens.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for reported failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> Result<ExitCode, CliError> {
    let config = TrendlensConfig::resolve(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> Result<ExitCode, CliError> {
    match command {
        ConfigCommand::Validate(command) => {
            TrendlensConfig::resolve(command.config.as_deref())
                .map_err(|err| CliError::new(format!("config invalid: {err}")))?;
            emit_line("config ok");
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn emit_line(message: &str) {
    #[allow(clippy::print_stdout, reason = "CLI user-facing output.")]
    {
        println!("{message}");
    }
}

/// Writes one error line to stderr.
fn emit_error(message: &str) {
    #[allow(clippy::print_stderr, reason = "CLI error reporting.")]
    {
        eprintln!("trendlens: {message}");
    }
}
