//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments take precedence over every file and environment layer.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Applies CLI overrides on top of loaded settings
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Load the base settings the way the CLI asks for
    ///
    /// `--config` selects single-file loading; otherwise the loader reads
    /// the `GROUP_NOTIFY_CONFIG_*` variables. `--env` overrides
    /// `GROUP_NOTIFY_APP_ENV`.
    pub fn from_cli_sources(
        config_path: Option<&Path>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let mut loader = match config_path {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };

        if let Some(environment) = environment {
            loader = loader.with_environment(environment);
        }

        let settings = loader.load()?;
        Ok(Self::new(settings, loader.environment()))
    }

    /// Merge CLI arguments into a copy of the base settings and validate
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        match &cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                dry_run: _,
            }) => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
            // stdout carries the result JSON
            Some(Commands::Send { .. }) if !cli.verbose => {
                config.logger.level = "error".to_string();
            }
            Some(Commands::Send { .. }) | None => {}
        }

        config.validate()?;

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}
