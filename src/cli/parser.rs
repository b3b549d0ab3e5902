//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Group push-notification relay for Firebase Cloud Messaging
#[derive(Parser, Debug)]
#[command(name = "group-notify")]
#[command(about = "Group push-notification relay for Firebase Cloud Messaging")]
#[command(long_about = "
group-notify accepts a notification request over HTTP and fans it out to a
list of device tokens through Firebase Cloud Messaging. The service-account
credential is read from the environment variable named by
messaging.credentials_env (FIREBASE_SERVICE_ACCOUNT by default).

EXAMPLES:
    # Start the server with default configuration
    group-notify serve

    # Start server on custom host and port
    group-notify serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    group-notify --config /etc/group-notify/production.toml serve

    # Check configuration without starting server
    group-notify serve --dry-run

    # Send one notification from the command line
    group-notify send --token abc --token def --title \"Hello\" --data groupId=42
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load exactly this TOML file instead of the layered `config/` directory.
    /// Environment overrides still apply.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Sets the log level to debug. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Sets the log level to error. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    ///
    /// Examples:
    ///   group-notify serve                           # Start with defaults
    ///   group-notify serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   group-notify serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 3000
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        ///
        /// Also checks that the credential environment variable is set and
        /// parses as a service-account key. Exits non-zero if anything is
        /// invalid.
        #[arg(long)]
        dry_run: bool,
    },
    /// Send one notification and print the per-token results as JSON
    ///
    /// Goes through the same validation and provider path as the HTTP
    /// endpoint. Exits non-zero if the dispatch as a whole fails.
    ///
    /// Examples:
    ///   group-notify send --token abc --title "Hello"
    ///   group-notify send --token abc --token def --title "Hi" --body "..." --data groupId=42
    Send {
        /// Device registration token, repeatable
        #[arg(short, long = "token", value_name = "TOKEN", required = true)]
        tokens: Vec<String>,

        /// Notification title
        #[arg(long)]
        title: String,

        /// Notification body
        #[arg(long)]
        body: Option<String>,

        /// Data payload entry as key=value, repeatable
        #[arg(short, long, value_name = "KEY=VALUE", value_parser = super::validation::parse_key_value)]
        data: Vec<(String, String)>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
