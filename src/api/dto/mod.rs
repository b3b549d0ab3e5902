//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `notification` - Group dispatch request/response DTOs
//! - `health` - Health report DTOs
//! - `error` - Uniform failure body

mod error;
mod health;
mod notification;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use notification::{
    SendErrorBody, SendGroupNotificationRequest, SendGroupNotificationResponse, SendResponseBody,
};
