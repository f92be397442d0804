// chirp-gate-cli/src/main.rs
// ============================================================================
// Module: Chirp Gate CLI Entry Point
// Description: Command dispatcher for the Chirp Gate MCP server.
// Purpose: Provide a safe CLI for server execution and catalog inspection.
// Dependencies: clap, chirp-gate-config, chirp-gate-mcp, tokio
// ============================================================================

//! ## Overview
//! The Chirp Gate CLI runs the gateway server (`serve`) and prints the tool
//! catalog (`tools`). Configuration resolution and validation live in
//! `chirp-gate-config`; the CLI only wires resolved configuration into the
//! server and reports failures on stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chirp_gate_config::ChirpGateConfig;
use chirp_gate_mcp::McpServer;
use chirp_gate_mcp::tools::tool_definitions;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Chirp Gate command-line interface.
#[derive(Debug, Parser)]
#[command(name = "chirp-gate", version, about = "Social platform MCP gateway")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the gateway server with the configured transport.
    Serve(ServeCommand),
    /// Print the tool catalog as JSON.
    Tools(ToolsCommand),
}

/// Arguments for the serve command.
#[derive(Debug, Args)]
struct ServeCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Arguments for the tools command.
#[derive(Debug, Args)]
struct ToolsCommand {
    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// User-facing failure message.
    message: String,
}

impl CliError {
    /// Builds a CLI error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools(command) => command_tools(&command),
    }
}

/// Runs the gateway server until the transport shuts down.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = ChirpGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server
        .serve()
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the tool catalog as JSON.
fn command_tools(command: &ToolsCommand) -> CliResult<ExitCode> {
    let definitions = tool_definitions();
    let payload = if command.compact {
        serde_json::to_string(&definitions)
    } else {
        serde_json::to_string_pretty(&definitions)
    }
    .map_err(|err| CliError::new(format!("catalog serialization failed: {err}")))?;
    write_stdout_line(&payload)
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes one line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Reports a failure on stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions."
    )]

    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
