//! Send command handler
//!
//! Runs one dispatch through the same DTO validation and service the HTTP
//! endpoint uses.

use crate::api::dto::{SendGroupNotificationRequest, SendGroupNotificationResponse};
use crate::config::Settings;
use crate::error::AppResult;
use crate::services::Services;

/// Handler for the send command
pub struct SendCommandHandler {
    services: Services,
}

impl SendCommandHandler {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self::new(Services::with_fcm(settings.messaging.clone())?))
    }

    /// Validate and dispatch one request
    ///
    /// Per-token failures are part of the returned response.
    pub async fn execute(
        &self,
        request: SendGroupNotificationRequest,
    ) -> AppResult<SendGroupNotificationResponse> {
        let notification = request.into_notification_request()?;
        let result = self.services.notifications.dispatch(notification).await?;
        Ok(SendGroupNotificationResponse::from(result))
    }
}
