//! Configuration settings structures for group-notify
//!
//! Everything here can be loaded from TOML files and overridden through
//! `GROUP_NOTIFY_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "group-notify".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/group-notify.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_files() -> usize {
    5
}

fn default_credentials_env() -> String {
    "FIREBASE_SERVICE_ACCOUNT".to_string()
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    100
}

fn default_max_tokens() -> usize {
    500
}

fn default_android_priority() -> String {
    "high".to_string()
}

fn default_sound() -> String {
    "default".to_string()
}

fn default_channel_id() -> String {
    "monie_notifications".to_string()
}

fn default_badge() -> u32 {
    1
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds, including the upstream call
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Serve the OpenAPI document and Swagger UI
    #[serde(default)]
    pub docs_enabled: bool,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_body_size: default_max_body_size(),
            docs_enabled: false,
        }
    }
}

// ============================================================================
// Messaging Configuration
// ============================================================================

/// Android delivery hints attached verbatim to every multicast message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidHints {
    /// Delivery priority: "high" or "normal"
    #[serde(default = "default_android_priority")]
    pub priority: String,

    #[serde(default = "default_sound")]
    pub sound: String,

    /// Notification channel the app registers on the device
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
}

impl Default for AndroidHints {
    fn default() -> Self {
        Self {
            priority: default_android_priority(),
            sound: default_sound(),
            channel_id: default_channel_id(),
        }
    }
}

/// APNs delivery hints attached verbatim to every multicast message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApnsHints {
    #[serde(default = "default_sound")]
    pub sound: String,

    #[serde(default = "default_badge")]
    pub badge: u32,
}

impl Default for ApnsHints {
    fn default() -> Self {
        Self {
            sound: default_sound(),
            badge: default_badge(),
        }
    }
}

/// Firebase Cloud Messaging configuration
///
/// The service-account credential itself never lives in a config file; only
/// the name of the environment variable that carries it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Environment variable holding the service-account JSON
    #[serde(default = "default_credentials_env")]
    pub credentials_env: String,

    /// FCM API base URL
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,

    /// Per-request timeout for FCM and OAuth calls, in seconds
    #[serde(default = "default_upstream_timeout")]
    pub request_timeout: u64,

    /// Connect timeout for FCM and OAuth calls, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Upper bound on in-flight per-token sends within one multicast
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Largest token list accepted for one multicast
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Ask FCM to validate messages without delivering them
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub android: AndroidHints,

    #[serde(default)]
    pub apns: ApnsHints,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            credentials_env: default_credentials_env(),
            endpoint: default_fcm_endpoint(),
            request_timeout: default_upstream_timeout(),
            connect_timeout: default_connect_timeout(),
            max_concurrency: default_max_concurrency(),
            max_tokens: default_max_tokens(),
            dry_run: false,
            android: AndroidHints::default(),
            apns: ApnsHints::default(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Colors are only emitted when stdout is a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// Size-based rotation settings for file logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Maximum file size in bytes before rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Maximum number of rotated files to keep
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_files: default_max_files(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`]
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format = self
            .file
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        let file = FileConfig {
            enabled: self.file.enabled,
            path: PathBuf::from(self.file.path),
            append: self.file.append,
            format,
            rotation: RotationConfig {
                max_size: self.file.rotation.max_size,
                max_files: self.file.rotation.max_files,
            },
        };
        let console = ConsoleConfig {
            enabled: self.console.enabled,
            colored: self.console.colored,
        };

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
            1024usize..=10_485_760usize,
            any::<bool>(),
        )
            .prop_map(
                |(host, port, request_timeout, max_body_size, docs_enabled)| ServerConfig {
                    host,
                    port,
                    request_timeout,
                    max_body_size,
                    docs_enabled,
                },
            )
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            any::<bool>(),
            any::<bool>(),
            prop_oneof![
                Just("json".to_string()),
                Just("full".to_string()),
                Just("compact".to_string()),
            ],
            1024u64..=100_000_000u64,
            1usize..=20usize,
        )
            .prop_map(
                |(level, colored, file_enabled, format, max_size, max_files)| LoggerSettings {
                    level,
                    console: ConsoleSettings {
                        enabled: true,
                        colored,
                    },
                    file: FileSettings {
                        enabled: file_enabled,
                        path: "logs/test.log".to_string(),
                        append: true,
                        format,
                        rotation: RotationSettings {
                            max_size,
                            max_files,
                        },
                    },
                },
            )
    }

    fn arb_messaging_config() -> impl Strategy<Value = MessagingConfig> {
        (
            "[A-Z][A-Z0-9_]{2,30}",
            1u64..=120u64,
            1usize..=500usize,
            any::<bool>(),
            prop_oneof![Just("high".to_string()), Just("normal".to_string())],
            0u32..=99u32,
        )
            .prop_map(
                |(credentials_env, request_timeout, max_concurrency, dry_run, priority, badge)| {
                    MessagingConfig {
                        credentials_env,
                        request_timeout,
                        max_concurrency,
                        dry_run,
                        android: AndroidHints {
                            priority,
                            ..Default::default()
                        },
                        apns: ApnsHints {
                            badge,
                            ..Default::default()
                        },
                        ..Default::default()
                    }
                },
            )
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_server_config(),
            arb_logger_settings(),
            arb_messaging_config(),
        )
            .prop_map(|(server, logger, messaging)| Settings {
                application: ApplicationConfig::default(),
                server,
                logger,
                messaging,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_settings_toml_round_trip(settings in arb_settings()) {
            let encoded = toml::to_string(&settings).expect("Settings should serialize to TOML");
            let decoded: Settings = toml::from_str(&encoded).expect("TOML should deserialize back");
            prop_assert_eq!(settings, decoded);
        }
    }

    #[test]
    fn test_messaging_defaults_match_mobile_client() {
        let config = MessagingConfig::default();
        assert_eq!(config.credentials_env, "FIREBASE_SERVICE_ACCOUNT");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.android.priority, "high");
        assert_eq!(config.android.sound, "default");
        assert_eq!(config.android.channel_id, "monie_notifications");
        assert_eq!(config.apns.sound, "default");
        assert_eq!(config.apns.badge, 1);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_server_defaults_and_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3000");
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(!config.docs_enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_messaging_section() {
        let settings: Settings = toml::from_str(
            r#"
[messaging]
dry_run = true

[messaging.apns]
badge = 3
"#,
        )
        .unwrap();
        assert!(settings.messaging.dry_run);
        assert_eq!(settings.messaging.apns.badge, 3);
        assert_eq!(settings.messaging.apns.sound, "default");
        assert_eq!(settings.messaging.android, AndroidHints::default());
    }

    #[test]
    fn test_into_logger_config_rejects_unknown_format() {
        let mut logger = LoggerSettings::default();
        logger.file.format = "xml".to_string();
        let err = logger.into_logger_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.file.format")
        );
    }

    #[test]
    fn test_into_logger_config_carries_rotation() {
        let mut logger = LoggerSettings::default();
        logger.file.rotation.max_files = 9;
        let config = logger.into_logger_config().unwrap();
        assert_eq!(config.file.rotation.max_files, 9);
        assert_eq!(config.file.format, LogFormat::Json);
    }
}
