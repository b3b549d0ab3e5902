//! Configuration management
//!
//! Settings are layered, lowest priority first:
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml` (not committed)
//! 4. `GROUP_NOTIFY_*` environment variables, `__` separating nested keys

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use loader::ConfigLoader;
pub use settings::{
    AndroidHints, ApnsHints, LoggerSettings, MessagingConfig, ServerConfig, Settings,
};
