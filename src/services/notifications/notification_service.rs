//! Notification service.
//!
//! Turns a validated [`NotificationRequest`] into one multicast send through
//! the lazily initialized messaging client.

use super::client::MessagingClient;
use super::provider::{DispatchResult, MulticastMessage, NotificationRequest, SendResponse};
use crate::config::MessagingConfig;
use crate::error::AppResult;

/// Dispatches group notifications
///
/// Cloning is cheap; clones share the messaging client.
#[derive(Clone, Debug)]
pub struct NotificationService {
    client: MessagingClient,
    config: MessagingConfig,
}

impl NotificationService {
    pub fn new(client: MessagingClient, config: MessagingConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &MessagingClient {
        &self.client
    }

    /// Send one notification to every token in the request
    ///
    /// Per-token delivery failures are part of the returned result. `Err`
    /// means the dispatch as a whole did not happen: the client could not be
    /// initialized or the provider rejected the call.
    pub async fn dispatch(&self, request: NotificationRequest) -> AppResult<DispatchResult> {
        tracing::info!(tokens = request.tokens.len(), "Received group notification request");
        tracing::debug!(title = %request.title, body = %request.body, "Notification content");

        let provider = self.client.provider().await?;
        let message = MulticastMessage::new(request, &self.config);

        tracing::info!(
            provider = provider.name(),
            tokens = message.tokens.len(),
            dry_run = self.config.dry_run,
            "Sending multicast notification"
        );

        let result = provider.send_each_for_multicast(&message).await?;

        tracing::info!(
            success_count = result.success_count(),
            failure_count = result.failure_count(),
            "Multicast notification finished"
        );

        for (token, response) in message.tokens.iter().zip(result.responses()) {
            if let SendResponse::Failure(error) = response {
                tracing::warn!(
                    token = %token,
                    code = %error.code,
                    error = %error.message,
                    "Failed to send to token"
                );
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::notifications::provider::MessagingProvider;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Records every message and fails the tokens listed in `reject`
    #[derive(Default)]
    struct RecordingProvider {
        reject: Vec<String>,
        seen: Mutex<Vec<MulticastMessage>>,
    }

    #[async_trait]
    impl MessagingProvider for RecordingProvider {
        async fn send_each_for_multicast(
            &self,
            message: &MulticastMessage,
        ) -> AppResult<DispatchResult> {
            self.seen.lock().unwrap().push(message.clone());
            let responses = message
                .tokens
                .iter()
                .enumerate()
                .map(|(i, token)| {
                    if self.reject.contains(token) {
                        SendResponse::failure(
                            "messaging/registration-token-not-registered",
                            "Requested entity was not found.",
                        )
                    } else {
                        SendResponse::success(format!("projects/test/messages/{}", i))
                    }
                })
                .collect();
            Ok(DispatchResult::from_responses(responses))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn request(tokens: &[&str]) -> NotificationRequest {
        NotificationRequest {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            title: "T".to_string(),
            body: String::new(),
            data: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_once_with_hints() {
        let provider = Arc::new(RecordingProvider::default());
        let service = NotificationService::new(
            MessagingClient::with_provider(provider.clone()),
            MessagingConfig::default(),
        );

        let result = service.dispatch(request(&["a", "b"])).await.unwrap();

        assert_eq!(result.success_count(), 2);
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tokens, vec!["a", "b"]);
        assert_eq!(seen[0].android.channel_id, "monie_notifications");
        assert_eq!(seen[0].apns.badge, 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_not_an_error() {
        let provider = Arc::new(RecordingProvider {
            reject: vec!["b".to_string()],
            ..Default::default()
        });
        let service = NotificationService::new(
            MessagingClient::with_provider(provider),
            MessagingConfig::default(),
        );

        let result = service.dispatch(request(&["a", "b", "c"])).await.unwrap();

        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(result.responses()[0].is_success());
        assert!(!result.responses()[1].is_success());
    }

    #[tokio::test]
    async fn test_client_failure_propagates() {
        let factory = || -> AppResult<Arc<dyn MessagingProvider>> {
            Err(AppError::configuration(
                "FIREBASE_SERVICE_ACCOUNT",
                "FIREBASE_SERVICE_ACCOUNT environment variable is not set",
            ))
        };
        let service = NotificationService::new(
            MessagingClient::new(Arc::new(factory)),
            MessagingConfig::default(),
        );

        let err = service.dispatch(request(&["a"])).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
        assert!(!service.client().is_initialized());
    }
}
