//! HTTP Error Mapping
//!
//! Every handler failure becomes a JSON body `{"detail": ...}` with a fixed
//! status per error class. Internal failures are logged and redacted.

use alerting::AlertError;
use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use inference_engine::InferenceError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::error;
use user_auth::AuthError;

/// Convenient result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range payload
    #[error("{0}")]
    Validation(String),
    /// Bad credentials or token
    #[error("{0}")]
    Unauthorized(String),
    /// Duplicate resource
    #[error("{0}")]
    Conflict(String),
    /// Model artifact not loaded
    #[error("{0}")]
    ModelUnavailable(String),
    /// Model invocation failed
    #[error("Error: {0}")]
    Inference(String),
    /// Anything else; details stay in the logs
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error class
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if matches!(self, ApiError::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(message) => ApiError::Conflict(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelUnavailable(_) => ApiError::ModelUnavailable(err.to_string()),
            other => ApiError::Inference(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Hashing(_) | AuthError::Signing(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::Unauthorized("Could not validate credentials".to_string()),
        }
    }
}

impl From<AlertError> for ApiError {
    fn from(err: AlertError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::ModelKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(InferenceError::ModelUnavailable(ModelKind::Acute)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(InferenceError::InferenceFailed("boom".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::Unauthorized("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Hashing("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
