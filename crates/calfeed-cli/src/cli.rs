//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// calfeed - Turn event records into iCalendar feeds
#[derive(Debug, Parser)]
#[command(name = "calfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALFEED_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a calendar from JSON event records
    Generate(GenerateArgs),

    /// List configured sources
    Sources,

    /// Render a configured source as a calendar
    Fetch(FetchArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `calfeed generate`.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    /// JSON record files to read (`-` for stdin; stdin when none given)
    pub inputs: Vec<PathBuf>,

    /// Calendar name (defaults to `[calendar] name`)
    #[arg(long, short)]
    pub name: Option<String>,

    /// Calendar description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Declared timezone label
    #[arg(long, short)]
    pub timezone: Option<String>,

    /// Write the calendar to this file instead of stdout
    #[arg(long, short, conflicts_with = "out_dir")]
    pub output: Option<PathBuf>,

    /// Write the calendar to `<DIR>/<slug of name>.ics`
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for `calfeed fetch`.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Source id from `[[sources]]`
    pub id: String,

    /// Query parameter passed to the source (can be repeated)
    #[arg(long = "param", short, value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub params: Vec<String>,

    /// Print the fetched events as JSON instead of a calendar
    #[arg(long)]
    pub json: bool,

    /// Write the output to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
