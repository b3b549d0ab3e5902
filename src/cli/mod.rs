//! CLI module for group-notify
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and send

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::{self, Settings};
use crate::logger::init_logger;

/// Load configuration files and apply CLI overrides
///
/// Returns the merged settings and the environment they were loaded for.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<(Settings, config::Environment)> {
    let merger =
        ConfigurationMerger::from_cli_sources(cli.config.as_deref(), cli.env.map(Into::into))
            .context("Configuration error")?;

    let settings = merger
        .merge_cli_args(cli)
        .context("Configuration merge error")?;

    Ok((settings, merger.environment()))
}

/// Install the global logger described by `settings`
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
