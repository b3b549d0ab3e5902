//! Group notification dispatch handler.
//!
//! Mounted as the router fallback and routed on method internally, so a
//! preflight or a stray method gets the dispatch endpoint's own answer
//! instead of axum's default 404/405.

use axum::{
    Json,
    body::to_bytes,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::cors::cors_headers;
use crate::api::doc::NOTIFICATION_TAG;
use crate::api::dto::{ErrorResponse, SendGroupNotificationRequest, SendGroupNotificationResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Send one notification to a group of devices.
///
/// `OPTIONS` answers the CORS preflight with 204. Any method other than
/// `POST` or `OPTIONS` is rejected with 405 before the body is read.
/// Per-token delivery failures are reported inside a 200 response.
#[utoipa::path(
    post,
    path = "/",
    tag = NOTIFICATION_TAG,
    request_body = SendGroupNotificationRequest,
    responses(
        (status = 200, description = "Dispatched; per-token outcomes in request order", body = SendGroupNotificationResponse),
        (status = 405, description = "Method other than POST or OPTIONS", body = ErrorResponse),
        (status = 500, description = "Invalid request, missing credentials or upstream failure", body = ErrorResponse)
    )
)]
pub async fn send_group_notification(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();

    match method {
        Method::OPTIONS => (StatusCode::NO_CONTENT, cors_headers()).into_response(),
        Method::POST => match dispatch(&state, request).await {
            Ok(body) => (StatusCode::OK, cors_headers(), Json(body)).into_response(),
            Err(err) => err.into_response(),
        },
        method => method_not_allowed(method).await,
    }
}

/// Rejects a method a route does not serve with the uniform failure body
pub async fn method_not_allowed(method: Method) -> Response {
    AppError::MethodNotAllowed {
        method: method.to_string(),
    }
    .into_response()
}

async fn dispatch(state: &AppState, request: Request) -> AppResult<SendGroupNotificationResponse> {
    let limit = state.settings.server.max_body_size;
    let bytes = to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| AppError::MalformedBody {
            message: format!("Failed to read request body: {e}"),
        })?;

    let notification = SendGroupNotificationRequest::from_body(&bytes)?;
    let result = state.services.notifications.dispatch(notification).await?;

    Ok(SendGroupNotificationResponse::from(result))
}
