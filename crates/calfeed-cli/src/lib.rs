//! Command-line front end for calfeed.
//!
//! This crate provides the `calfeed` binary: generating calendars from JSON
//! record files and rendering configured sources.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
