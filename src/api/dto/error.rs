//! Error response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform failure body returned by the dispatch endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"success": false, "error": "Title is required"}))]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable failure description
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
