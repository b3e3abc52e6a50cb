// src/errors.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-path error taxonomy.
///
/// Validation failures reject the request before any inference or logging
/// happens. `ModelUnavailable` only exists for completeness of the HTTP
/// mapping; a missing or corrupt artifact aborts startup instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Model artifact unavailable: {0}")]
    ModelUnavailable(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let error = ServiceError::Validation {
            field: "Age".to_string(),
            reason: "expected an integer".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid request field 'Age': expected an integer"
        );
    }

    #[test]
    fn test_model_unavailable_display() {
        let error = ServiceError::ModelUnavailable("artifact not loaded".to_string());
        assert_eq!(
            error.to_string(),
            "Model artifact unavailable: artifact not loaded"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServiceError>();
    }
}
