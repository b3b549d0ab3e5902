//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::{Environment, Settings};
use crate::error::AppResult;
use crate::server::Server;
use crate::services::notifications::{FcmProviderFactory, ProviderFactory};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Run the server, or only validate when `dry_run` is set
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }

        Server::new(self.config, self.environment).run().await
    }

    /// Validate configuration and credentials without starting the server
    ///
    /// Unlike a running server, a dry run fails on a missing or malformed
    /// credential. No network call is made.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid ({})", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());

        let provider = FcmProviderFactory::new(self.config.messaging.clone())?.build()?;
        println!(
            "✓ Credential in {} is usable ({} provider)",
            self.config.messaging.credentials_env,
            provider.name()
        );

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
