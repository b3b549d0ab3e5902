//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. Timeout - bounds the whole request, upstream call included
///
/// `server.max_body_size` is enforced by the dispatch handler's bounded
/// read so an oversized body gets the uniform JSON failure.
///
/// # Routes
/// - `/health`, `/health/live` - Operational probes
/// - `/swagger-ui` - API docs, when `server.docs_enabled`
/// - every other path - Group notification dispatch
///
/// A known route hit with the wrong method gets the same 405 body as the
/// dispatch endpoint.
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let timeout = Duration::from_secs(server.request_timeout);

    let mut router = Router::new()
        .merge(handlers::health::health_routes())
        .fallback(handlers::notifications::send_group_notification);

    if server.docs_enabled {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .method_not_allowed_fallback(handlers::notifications::method_not_allowed)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        // So logging runs after request_id has set the ID
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::Services;
    use crate::services::notifications::{
        DispatchResult, MessagingClient, MessagingProvider, MulticastMessage,
    };
    use crate::error::AppResult;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct EmptyProvider;

    #[async_trait]
    impl MessagingProvider for EmptyProvider {
        async fn send_each_for_multicast(
            &self,
            _message: &MulticastMessage,
        ) -> AppResult<DispatchResult> {
            Ok(DispatchResult::from_responses(Vec::new()))
        }

        fn name(&self) -> &'static str {
            "empty"
        }
    }

    fn router(docs_enabled: bool) -> Router {
        let mut settings = Settings::default();
        settings.server.docs_enabled = docs_enabled;
        let services = Services::new(
            MessagingClient::with_provider(Arc::new(EmptyProvider)),
            settings.messaging.clone(),
        );
        create_router(AppState::new(services, settings))
    }

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_routes_take_precedence_over_dispatch() {
        assert_eq!(status_of(router(false), "/health/live").await, StatusCode::OK);
        assert_eq!(status_of(router(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_served_only_when_enabled() {
        assert_eq!(
            status_of(router(true), "/api-docs/openapi.json").await,
            StatusCode::OK
        );
        // Falls through to the dispatch endpoint, which rejects GET
        assert_eq!(
            status_of(router(false), "/api-docs/openapi.json").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
