use crate::config::error::ConfigError;
use thiserror::Error;
use validator::ValidationErrors;

/// Application-wide error type.
///
/// Every failure on the dispatch path lands in one of these variants. The
/// variants stay distinct internally so callers and tests can tell a bad
/// request from a missing credential or a failed upstream call, even though
/// the HTTP layer renders most of them with the same response shape.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request payload failed a field-level check
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Request body could not be decoded into the expected shape
    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    /// HTTP method not accepted by the dispatch endpoint
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    /// Missing or unusable configuration, including provider credentials
    #[error("Configuration error: {key}: {message}")]
    Configuration { key: String, message: String },

    /// The messaging provider rejected the call as a whole or could not be reached
    #[error("Upstream {provider} call failed: {message}")]
    Upstream { provider: String, message: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

/// Coarse classification of an [`AppError`], used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Routing,
    Validation,
    Configuration,
    Upstream,
    Internal,
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// First failure from a `validator` run, taking fields in `field_order`
    ///
    /// Fields not listed in `field_order` come last, by name.
    pub fn from_validation_errors(errors: &ValidationErrors, field_order: &[&str]) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| {
            let rank = |name: &str| {
                field_order
                    .iter()
                    .position(|f| *f == name)
                    .unwrap_or(field_order.len())
            };
            rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
        });

        fields
            .into_iter()
            .find_map(|(field, field_errors)| {
                field_errors.first().map(|error| {
                    let reason = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    AppError::validation(field.to_string(), reason)
                })
            })
            .unwrap_or_else(|| AppError::validation("body", errors.to_string()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MethodNotAllowed { .. } => ErrorKind::Routing,
            AppError::Validation { .. } | AppError::MalformedBody { .. } => ErrorKind::Validation,
            AppError::Configuration { .. } => ErrorKind::Configuration,
            AppError::Upstream { .. } => ErrorKind::Upstream,
            AppError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Human-readable message returned to HTTP clients in the `error` field.
    ///
    /// Carries the bare reason without the variant prefix used by `Display`.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation { reason, .. } => reason.clone(),
            AppError::MalformedBody { message } => message.clone(),
            AppError::MethodNotAllowed { .. } => "Method not allowed".to_string(),
            AppError::Configuration { message, .. } => message.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Internal { source } => {
                let message = source.to_string();
                if message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                }
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::MalformedBody {
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            message: error.to_string(),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_client_message_is_bare_reason() {
        let err = AppError::validation("tokens", "Invalid or empty tokens array");
        assert_eq!(err.client_message(), "Invalid or empty tokens array");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("tokens"));
    }

    #[test]
    fn test_method_not_allowed_message() {
        let err = AppError::MethodNotAllowed {
            method: "GET".to_string(),
        };
        assert_eq!(err.client_message(), "Method not allowed");
        assert_eq!(err.kind(), ErrorKind::Routing);
    }

    #[test]
    fn test_serde_error_becomes_malformed_body() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::MalformedBody { .. }));
        assert!(!err.client_message().is_empty());
    }

    #[test]
    fn test_config_error_conversion_keeps_field() {
        let err: AppError = ConfigError::validation("server.port", "bad port").into();
        match err {
            AppError::Configuration { key, message } => {
                assert_eq!(key, "server.port");
                assert!(message.contains("bad port"));
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_errors_follow_field_order() {
        use validator::Validate;

        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 1, message = "Title is required"))]
            title: String,
            #[validate(length(min = 1, message = "Invalid or empty tokens array"))]
            tokens: Vec<String>,
        }

        let errors = Payload {
            title: String::new(),
            tokens: Vec::new(),
        }
        .validate()
        .unwrap_err();

        let err = AppError::from_validation_errors(&errors, &["tokens", "title"]);
        assert_eq!(err.client_message(), "Invalid or empty tokens array");

        let err = AppError::from_validation_errors(&errors, &["title"]);
        assert_eq!(err.client_message(), "Title is required");
    }

    #[test]
    fn test_internal_error_falls_back_to_unknown() {
        let err = AppError::Internal {
            source: anyhow::anyhow!(""),
        };
        assert_eq!(err.client_message(), "Unknown error");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
