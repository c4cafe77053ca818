//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors are rendered as a
//! JSON body `{ "message": ..., "errors"?: [...] }`; server errors are
//! captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::catalog::CatalogError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// No credentials were presented.
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials were presented but don't grant access.
    #[error("{0}")]
    Forbidden(String),

    /// Request body exceeded the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::Validation(_)
                | CatalogError::Duplicate
                | CatalogError::UnsupportedImage(_) => StatusCode::BAD_REQUEST,
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::Repository(_) | CatalogError::Sidecar(_) | CatalogError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Catalog(CatalogError::Validation(errors)) => ErrorBody {
                message: "Validation Error".to_owned(),
                errors: Some(errors.messages()),
            },
            _ => ErrorBody {
                message: self.to_string(),
                errors: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use optica_core::ProductInput;

    use super::*;
    use crate::db::RepositoryError;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_lists_messages() {
        let errors = ProductInput::default().validate().unwrap_err();
        let (status, json) = body_json(CatalogError::Validation(errors).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Validation Error");
        assert!(
            json["errors"]
                .as_array()
                .unwrap()
                .iter()
                .any(|m| m == "Name is required")
        );
    }

    #[tokio::test]
    async fn test_duplicate_is_bad_request() {
        let err: AppError = CatalogError::from(RepositoryError::Conflict("x".to_owned())).into();
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Duplicate field value");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let (status, json) = body_json(CatalogError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_internal_error_exposes_raw_message() {
        let err: AppError =
            CatalogError::from(RepositoryError::DataCorruption("bad row".to_owned())).into();
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "data corruption: bad row");
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            AppError::Unauthorized("x".to_owned()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".to_owned()).status(),
            StatusCode::FORBIDDEN
        );
    }
}
