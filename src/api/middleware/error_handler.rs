//! Error handler for converting AppError to HTTP responses.
//!
//! Every failure on the dispatch path is rendered as
//! `{"success": false, "error": "..."}`. Only the method gate answers 405;
//! validation, configuration and upstream failures all answer 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::cors::cors_headers;
use crate::api::dto::ErrorResponse;
use crate::error::{AppError, ErrorKind};

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - MethodNotAllowed → 405, without CORS headers
    /// - everything else → 500 with CORS headers
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.client_message());

        match self.kind() {
            ErrorKind::Routing => {
                tracing::warn!(error = %self, "Rejected request method");
                (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
            }
            ErrorKind::Validation => {
                tracing::warn!(error = %self, "Rejected notification request");
                server_error(body)
            }
            ErrorKind::Configuration | ErrorKind::Upstream | ErrorKind::Internal => {
                tracing::error!(error = %self, kind = ?self.kind(), "Notification dispatch failed");
                server_error(body)
            }
        }
    }
}

fn server_error(body: ErrorResponse) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors_headers(),
        Json(body),
    )
        .into_response()
}
