//! CLI command definitions for the `askme` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod persona;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with an Ask-Me-Anything persona from the terminal.
#[derive(Parser)]
#[command(name = "askme", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend root URL (without the /v1 prefix).
    #[arg(long, env = "ASKME_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key sent as the X-API-Key header.
    #[arg(long, env = "ASKME_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file to read instead of ~/.askme/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with the persona.
    Chat,

    /// Show the persona currently published by the backend.
    Persona,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "askme",
            "chat",
            "--base-url",
            "http://127.0.0.1:9000",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parses_completions_shell() {
        let cli = Cli::try_parse_from(["askme", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Bash }));
    }
}
