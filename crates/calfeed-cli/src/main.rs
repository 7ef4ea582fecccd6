//! calfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calfeed_cli::cli::{Cli, Command, ConfigAction};
use calfeed_cli::commands;
use calfeed_cli::config::CliConfig;
use calfeed_cli::error::CliResult;
use calfeed_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    match config.tracing_config(cli.debug) {
        Ok(tracing_config) => {
            if let Err(e) = init_tracing(tracing_config) {
                eprintln!("warning: {}", e);
            }
        }
        Err(e) => eprintln!("warning: {}", e),
    }

    // Run the command
    match run(cli, config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<CliConfig> {
    match cli.config {
        Some(ref path) => CliConfig::load_from(path),
        None => CliConfig::load(),
    }
}

async fn run(cli: Cli, config: CliConfig, config_path: &std::path::Path) -> CliResult<()> {
    match cli.command {
        Command::Generate(args) => commands::generate::generate(&args, &config).await,
        Command::Sources => commands::sources::sources(&config),
        Command::Fetch(args) => commands::fetch::fetch(&args, &config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(config_path),
        },
    }
}
