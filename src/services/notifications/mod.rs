//! Push notification dispatch.
//!
//! `MessagingProvider` is the seam between the HTTP layer and the push
//! backend. `FcmProvider` talks to Firebase Cloud Messaging; tests plug in
//! their own providers through `MessagingClient`.

mod client;
mod fcm_provider;
mod provider;

pub mod notification_service;

pub use client::{MessagingClient, ProviderFactory};
pub use fcm_provider::{FcmProvider, FcmProviderFactory, ServiceAccountKey, normalize_error_code};
pub use notification_service::NotificationService;
pub use provider::{
    DispatchResult, MessagingProvider, MulticastMessage, Notification, NotificationRequest,
    SendError, SendResponse,
};
