//! Notification dispatch DTOs for API requests and responses.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::notifications::{DispatchResult, NotificationRequest, SendResponse};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for sending a notification to a group of devices.
///
/// `tokens` and `title` accept any JSON value so that a wrongly typed field
/// is reported with the same message as a missing one.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[schema(example = json!({
    "tokens": ["fcm-token-1", "fcm-token-2"],
    "title": "New expense in Trip to Lisbon",
    "body": "Alice added Dinner (42.00)",
    "data": {"groupId": "grp_123", "type": "expense"}
}))]
pub struct SendGroupNotificationRequest {
    /// Device registration tokens
    #[serde(default, deserialize_with = "string_list")]
    #[validate(
        required(message = "Invalid or empty tokens array"),
        length(min = 1, message = "Invalid or empty tokens array")
    )]
    #[schema(value_type = Vec<String>, min_items = 1)]
    pub tokens: Option<Vec<String>>,

    #[serde(default, deserialize_with = "plain_string")]
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    #[schema(value_type = String, min_length = 1)]
    pub title: Option<String>,

    /// Defaults to an empty string
    #[serde(default)]
    pub body: Option<String>,

    /// Extra key/value payload delivered to the app
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

impl SendGroupNotificationRequest {
    /// Field order used when reporting validation failures
    const FIELD_ORDER: &'static [&'static str] = &["tokens", "title"];

    /// Decode and validate a raw request body
    pub fn from_body(body: &[u8]) -> AppResult<NotificationRequest> {
        let dto: Self = serde_json::from_slice(body)?;
        dto.into_notification_request()
    }

    /// Validate and convert into the domain request
    pub fn into_notification_request(self) -> AppResult<NotificationRequest> {
        self.validate()
            .map_err(|errors| AppError::from_validation_errors(&errors, Self::FIELD_ORDER))?;

        Ok(NotificationRequest {
            tokens: self.tokens.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            data: self.data.unwrap_or_default(),
        })
    }
}

/// Array of strings, anything else becomes `None`
fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(None);
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// String, anything else becomes `None`
fn plain_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Provider error for one token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendErrorBody {
    #[schema(example = "messaging/registration-token-not-registered")]
    pub code: String,
    #[schema(example = "Requested entity was not found.")]
    pub message: String,
}

/// Outcome for one token, in request order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponseBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "projects/monie/messages/0:1700000000000000%abc")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SendErrorBody>,
}

impl From<SendResponse> for SendResponseBody {
    fn from(response: SendResponse) -> Self {
        match response {
            SendResponse::Success { message_id } => Self {
                success: true,
                message_id: Some(message_id),
                error: None,
            },
            SendResponse::Failure(error) => Self {
                success: false,
                message_id: None,
                error: Some(SendErrorBody {
                    code: error.code,
                    message: error.message,
                }),
            },
        }
    }
}

/// Response body for a completed dispatch, including partial failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendGroupNotificationResponse {
    /// Always `true`; per-token failures are reported in `responses`
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponseBody>,
}

impl From<DispatchResult> for SendGroupNotificationResponse {
    fn from(result: DispatchResult) -> Self {
        Self {
            success: true,
            success_count: result.success_count(),
            failure_count: result.failure_count(),
            responses: result
                .into_responses()
                .into_iter()
                .map(SendResponseBody::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> AppResult<NotificationRequest> {
        SendGroupNotificationRequest::from_body(value.to_string().as_bytes())
    }

    fn message_of(result: AppResult<NotificationRequest>) -> String {
        result.unwrap_err().client_message()
    }

    #[test]
    fn test_valid_request_with_defaults() {
        let request = decode(json!({"tokens": ["a", "b"], "title": "T"})).unwrap();
        assert_eq!(request.tokens, vec!["a", "b"]);
        assert_eq!(request.title, "T");
        assert_eq!(request.body, "");
        assert!(request.data.is_empty());
    }

    #[test]
    fn test_body_and_data_carried() {
        let request = decode(json!({
            "tokens": ["a"],
            "title": "T",
            "body": "B",
            "data": {"groupId": "42"}
        }))
        .unwrap();
        assert_eq!(request.body, "B");
        assert_eq!(request.data["groupId"], "42");
    }

    #[test]
    fn test_tokens_rejections() {
        for body in [
            json!({"title": "T"}),
            json!({"tokens": [], "title": "T"}),
            json!({"tokens": "abc", "title": "T"}),
            json!({"tokens": null, "title": "T"}),
            json!({"tokens": ["a", 1], "title": "T"}),
        ] {
            assert_eq!(message_of(decode(body)), "Invalid or empty tokens array");
        }
    }

    #[test]
    fn test_title_rejections() {
        for body in [
            json!({"tokens": ["a"]}),
            json!({"tokens": ["a"], "title": ""}),
            json!({"tokens": ["a"], "title": 5}),
        ] {
            assert_eq!(message_of(decode(body)), "Title is required");
        }
    }

    #[test]
    fn test_tokens_checked_before_title() {
        assert_eq!(message_of(decode(json!({}))), "Invalid or empty tokens array");
    }

    #[test]
    fn test_malformed_json_is_malformed_body() {
        let err = SendGroupNotificationRequest::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::MalformedBody { .. }));

        let err = decode(json!({"tokens": ["a"], "title": "T", "data": {"n": 1}})).unwrap_err();
        assert!(matches!(err, AppError::MalformedBody { .. }));
    }

    #[test]
    fn test_response_wire_shape() {
        let result = DispatchResult::from_responses(vec![
            SendResponse::success("projects/p/messages/1"),
            SendResponse::failure("messaging/invalid-argument", "bad token"),
        ]);

        let body = serde_json::to_value(SendGroupNotificationResponse::from(result)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "successCount": 1,
                "failureCount": 1,
                "responses": [
                    {"success": true, "messageId": "projects/p/messages/1"},
                    {"success": false, "error": {"code": "messaging/invalid-argument", "message": "bad token"}}
                ]
            })
        );
    }

    proptest! {
        #[test]
        fn prop_non_empty_tokens_and_title_accepted(
            tokens in prop::collection::vec("[A-Za-z0-9:_-]{1,40}", 1..20),
            title in "\\PC{1,60}",
        ) {
            let request = decode(json!({"tokens": tokens.clone(), "title": title.clone()})).unwrap();
            prop_assert_eq!(request.tokens, tokens);
            prop_assert_eq!(request.title, title);
        }
    }
}
