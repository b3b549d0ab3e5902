//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppResult;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: the messaging client and settings are behind `Arc`s.
#[derive(Clone, Debug)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Settings the process was started with
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(services: Services, settings: Settings) -> Self {
        Self {
            services,
            settings: Arc::new(settings),
        }
    }

    /// State backed by Firebase Cloud Messaging
    ///
    /// Credentials are read on the first dispatch, not here.
    pub fn from_settings(settings: Settings) -> AppResult<Self> {
        let services = Services::with_fcm(settings.messaging.clone())?;
        Ok(Self::new(services, settings))
    }
}
