//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{SendCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::api::dto::SendGroupNotificationRequest;
use crate::config::{Environment, Settings};

/// Execute a CLI command with merged and validated settings
///
/// Running without a subcommand starts the server.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
        Some(Commands::Send {
            tokens,
            title,
            body,
            data,
        }) => {
            let request = SendGroupNotificationRequest {
                tokens: Some(tokens.clone()),
                title: Some(title.clone()),
                body: body.clone(),
                data: Some(data.iter().cloned().collect()),
            };

            let response = SendCommandHandler::from_settings(&settings)?
                .execute(request)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
