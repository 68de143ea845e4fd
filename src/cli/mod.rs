//! Command-line entry points: argument parsing, configuration overrides and
//! the `serve` / `migrate` subcommands.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;

/// Load configuration for `cli`, with its flags applied, and validate it.
pub fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli).context("Failed to locate configuration")?;
    merger.load(cli).context("Invalid configuration")
}

pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Invalid logger configuration")?;
    init_logger(config).context("Failed to initialise logger")
}
