use utoipa::OpenApi;

pub const HEALTH_TAG: &str = "Health";
pub const NOTIFICATION_TAG: &str = "Notifications";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "group-notify",
        description = "Relays group push notifications to Firebase Cloud Messaging",
    ),
    paths(
        crate::api::handlers::notifications::send_group_notification,
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::liveness_check,
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::SendGroupNotificationRequest,
            crate::api::dto::SendGroupNotificationResponse,
            crate::api::dto::SendResponseBody,
            crate::api::dto::SendErrorBody,
            crate::api::dto::HealthResponse,
            crate::api::dto::HealthStatus,
            crate::api::dto::ComponentHealth,
        )
    ),
    tags(
        (name = NOTIFICATION_TAG, description = "Group notification dispatch"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_dispatch_and_health_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/".to_string()));
        assert!(paths.contains(&"/health".to_string()));
        assert!(paths.contains(&"/health/live".to_string()));
    }
}
