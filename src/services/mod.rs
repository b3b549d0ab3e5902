//! Service layer for business logic operations.
//!
//! Services sit between the HTTP handlers and the messaging provider.

pub mod notifications;

pub use notifications::NotificationService;

use std::sync::Arc;

use crate::config::MessagingConfig;
use crate::error::AppResult;
use notifications::{FcmProviderFactory, MessagingClient};

/// Aggregates all services for convenient access.
///
/// Designed to be used as Axum application state. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct Services {
    pub notifications: NotificationService,
}

impl Services {
    /// Services backed by an explicit messaging client
    pub fn new(client: MessagingClient, config: MessagingConfig) -> Self {
        Self {
            notifications: NotificationService::new(client, config),
        }
    }

    /// Services backed by Firebase Cloud Messaging
    ///
    /// Credentials are not read here; the FCM provider is built on first
    /// dispatch.
    pub fn with_fcm(config: MessagingConfig) -> AppResult<Self> {
        let factory = FcmProviderFactory::new(config.clone())?;
        Ok(Self::new(MessagingClient::new(Arc::new(factory)), config))
    }
}
