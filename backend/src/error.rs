//! Error handling for the Block Inventory Platform
//!
//! Every failure leaves the server as `{ message, code, field? }` JSON.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;
use shared::validation::FieldError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", msg.clone(), None),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("CONFLICT", message.clone(), Some(resource.clone())),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource), None),
            ),
            // Constraint violations that slipped past the pre-checks
            AppError::Store(StoreError::UniqueViolation(constraint)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "CONFLICT",
                    "A record with this name already exists",
                    Some(constraint.clone()),
                ),
            ),
            AppError::Store(StoreError::ForeignKeyViolation(constraint)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "CONFLICT",
                    "The record is referenced by existing blocks",
                    Some(constraint.clone()),
                ),
            ),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("STORE_ERROR", "A database error occurred", None),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let response = AppError::from(FieldError::new("density", "density must be greater than 0"))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "density");
    }

    #[tokio::test]
    async fn test_conflict_is_bad_request() {
        let response = AppError::conflict("blockType", "Block type already exists").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let err = AppError::from(StoreError::UniqueViolation("suppliers_supplier_name_key".into()));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_other_store_errors_are_500() {
        let err = AppError::from(StoreError::Migration(
            sqlx::migrate::MigrateError::VersionMissing(1),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "STORE_ERROR");
        assert_eq!(body["message"], "A database error occurred");
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = AppError::NotFound("Supplier".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Supplier not found");
        assert!(body.get("field").is_none());
    }
}
