//! Configuration loader for group-notify
//!
//! `ConfigLoader` assembles [`Settings`] from TOML files and environment
//! variables with the precedence documented on the `config` module.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "GROUP_NOTIFY_CONFIG_DIR";

/// Environment variable for a single configuration file
const CONFIG_FILE_ENV: &str = "GROUP_NOTIFY_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Prefix for configuration overrides, e.g. `GROUP_NOTIFY_SERVER__PORT`
const ENV_PREFIX: &str = "GROUP_NOTIFY";

const ENV_SEPARATOR: &str = "__";

/// Where the file layers come from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// `default.toml`, `{environment}.toml` and `local.toml` from one directory
    Layered(PathBuf),
    /// Exactly one file, no layering
    SingleFile(PathBuf),
}

/// Loads layered configuration
#[derive(Debug)]
pub struct ConfigLoader {
    source: Source,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from the process environment
    ///
    /// Reads `GROUP_NOTIFY_CONFIG_DIR`, `GROUP_NOTIFY_CONFIG_FILE` and
    /// `GROUP_NOTIFY_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both the directory and the file variable are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok();

        let source = match (config_dir, config_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::mutual_exclusivity(format!(
                    "{} and {} cannot both be set. Use {} for layered configuration or {} for a single configuration file.",
                    CONFIG_DIR_ENV, CONFIG_FILE_ENV, CONFIG_DIR_ENV, CONFIG_FILE_ENV
                )));
            }
            (None, Some(file)) => Source::SingleFile(PathBuf::from(file)),
            (Some(dir), None) => Source::Layered(PathBuf::from(dir)),
            (None, None) => Source::Layered(PathBuf::from(DEFAULT_CONFIG_DIR)),
        };

        Ok(Self {
            source,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Layered loading from `dir` for the given environment
    pub fn from_dir(dir: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            source: Source::Layered(dir.into()),
            environment,
        }
    }

    /// Load exactly one file (plus environment overrides)
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::SingleFile(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Override the environment used to pick `{environment}.toml`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load and validate settings from all sources
    ///
    /// # Errors
    ///
    /// - `default.toml` (or the single file) is missing
    /// - a file fails to parse or deserialize
    /// - the merged settings fail validation
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = match &self.source {
            Source::SingleFile(path) => add_file(Config::builder(), path, true)?,
            Source::Layered(dir) => {
                let builder = add_file(Config::builder(), &dir.join("default.toml"), true)?;
                let env_file = dir.join(format!("{}.toml", self.environment.as_str()));
                let builder = add_file(builder, &env_file, false)?;
                add_file(builder, &dir.join("local.toml"), false)?
            }
        };

        // Environment variables always win: GROUP_NOTIFY_SERVER__PORT -> server.port
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()
            .map_err(ConfigError::from)
    }
}

fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    let name = path.to_str().ok_or_else(|| {
        ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
    })?;

    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
}
