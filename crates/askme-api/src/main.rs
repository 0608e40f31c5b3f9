//! askme CLI entry point.
//!
//! Binary name: `askme`
//!
//! Parses CLI arguments, sets up tracing, resolves the client configuration,
//! then dispatches to the chat loop or the persona command.

mod cli;

use clap::Parser;
use clap_complete::generate;

use askme_infra::config::{ConfigOverrides, resolve_client_config};
use askme_observe::{LogFormat, TracingOptions};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "askme", &mut std::io::stdout());
        return Ok(());
    }

    let mut tracing_options = TracingOptions::from_verbosity(cli.verbose, cli.quiet);
    tracing_options.enable_otel = cli.otel;
    if cli.json {
        tracing_options.format = LogFormat::Json;
    }
    askme_observe::init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        api_key: cli.api_key.clone(),
    };
    let config = resolve_client_config(cli.config.as_deref(), overrides).await;

    let result = match cli.command {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&config).await,
        Commands::Persona => cli::persona::show_persona(&config, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    askme_observe::shutdown_tracing();
    result
}
