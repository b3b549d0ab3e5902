//! Configuration validation logic
//!
//! Each settings section validates itself and reports the first offending
//! field by its dotted path.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{
    FileSettings, LoggerSettings, MessagingConfig, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_ANDROID_PRIORITIES: &[&str] = &["high", "normal"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Body size limit must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "Maximum body size must be greater than 0 bytes.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        if self.rotation.max_size == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_size",
                "Rotation size must be greater than 0 bytes.",
            ));
        }

        if self.rotation.max_files == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_files",
                "At least one rotated file must be kept.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl MessagingConfig {
    /// Validate messaging configuration
    ///
    /// Only the shape is checked here. Whether the credential variable is
    /// actually set is a request-time concern, so a misconfigured deployment
    /// still starts and reports the problem on every dispatch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env_name = self.credentials_env.trim();
        if env_name.is_empty() || env_name.contains('=') || env_name.contains(char::is_whitespace)
        {
            return Err(ConfigError::validation(
                "messaging.credentials_env",
                format!(
                    "Invalid environment variable name '{}'.",
                    self.credentials_env
                ),
            ));
        }

        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::validation(
                "messaging.endpoint",
                format!("Invalid URL '{}': {}", self.endpoint, e),
            )
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::validation(
                "messaging.endpoint",
                "Endpoint must use http or https protocol.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "messaging.request_timeout",
                "Upstream request timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "messaging.connect_timeout",
                "Upstream connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::validation(
                "messaging.max_concurrency",
                "Send concurrency must be at least 1.",
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::validation(
                "messaging.max_tokens",
                "Token limit must be at least 1.",
            ));
        }

        if !VALID_ANDROID_PRIORITIES.contains(&self.android.priority.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "messaging.android.priority",
                format!(
                    "Invalid priority '{}'. Valid priorities are: {}",
                    self.android.priority,
                    VALID_ANDROID_PRIORITIES.join(", ")
                ),
            ));
        }

        if self.android.channel_id.trim().is_empty() {
            return Err(ConfigError::validation(
                "messaging.android.channel_id",
                "Android channel id cannot be empty.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all sections, returning the first error encountered
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.messaging.validate()?;
        Ok(())
    }
}
