//! Core messaging provider trait and types.
//!
//! A provider takes one [`MulticastMessage`] and reports one outcome per
//! token, in token order. Whole-call failures (bad credentials, oversized
//! token list) surface as `Err`; per-token failures never do.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::{AndroidHints, ApnsHints, MessagingConfig};
use crate::error::AppResult;

/// A validated request to notify a group of devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Device registration tokens, never empty
    pub tokens: Vec<String>,
    /// Notification title, never empty
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// Title and body shown by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// One message addressed to many tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: Notification,
    pub data: HashMap<String, String>,
    pub android: AndroidHints,
    pub apns: ApnsHints,
}

impl MulticastMessage {
    /// Attach the configured platform hints to a request
    pub fn new(request: NotificationRequest, config: &MessagingConfig) -> Self {
        Self {
            tokens: request.tokens,
            notification: Notification {
                title: request.title,
                body: request.body,
            },
            data: request.data,
            android: config.android.clone(),
            apns: config.apns.clone(),
        }
    }
}

/// Provider error for a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError {
    /// Normalized code such as `messaging/registration-token-not-registered`
    pub code: String,
    pub message: String,
}

impl SendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Outcome of sending to one token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResponse {
    Success { message_id: String },
    Failure(SendError),
}

impl SendResponse {
    pub fn success(message_id: impl Into<String>) -> Self {
        SendResponse::Success {
            message_id: message_id.into(),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        SendResponse::Failure(SendError::new(code, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendResponse::Success { .. })
    }
}

/// Per-token outcomes of one multicast, in input token order
///
/// Counts are derived from the responses so they always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    success_count: usize,
    failure_count: usize,
    responses: Vec<SendResponse>,
}

impl DispatchResult {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.is_success()).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    pub fn responses(&self) -> &[SendResponse] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<SendResponse> {
        self.responses
    }
}

/// Trait for push messaging backends
///
/// Uses `async_trait` so providers can sit behind `Arc<dyn MessagingProvider>`.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Send `message` to each of its tokens
    ///
    /// Returns exactly one response per token, in token order.
    async fn send_each_for_multicast(&self, message: &MulticastMessage)
    -> AppResult<DispatchResult>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_responses() {
        let result = DispatchResult::from_responses(vec![
            SendResponse::success("projects/p/messages/1"),
            SendResponse::failure("messaging/invalid-argument", "bad token"),
            SendResponse::success("projects/p/messages/2"),
        ]);

        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(!result.responses()[1].is_success());
    }

    #[test]
    fn test_empty_result() {
        let result = DispatchResult::from_responses(Vec::new());
        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failure_count(), 0);
    }

    #[test]
    fn test_multicast_carries_configured_hints() {
        let mut config = MessagingConfig::default();
        config.apns.badge = 7;

        let message = MulticastMessage::new(
            NotificationRequest {
                tokens: vec!["a".into(), "b".into()],
                title: "Dinner".into(),
                body: String::new(),
                data: HashMap::from([("groupId".to_string(), "42".to_string())]),
            },
            &config,
        );

        assert_eq!(message.tokens, vec!["a", "b"]);
        assert_eq!(message.notification.title, "Dinner");
        assert_eq!(message.android.channel_id, "monie_notifications");
        assert_eq!(message.android.priority, "high");
        assert_eq!(message.apns.badge, 7);
        assert_eq!(message.data["groupId"], "42");
    }
}
