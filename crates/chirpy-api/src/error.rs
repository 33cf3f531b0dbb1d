//! API error handling
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Internal
//! causes are logged and replaced by a generic message.
//!
//! Author: hephaex@gmail.com

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chirpy_core::ChirpyError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable message
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    Database(String),
    Auth(AuthError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Auth(err) => return err.into_response(),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new(msg)),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new(msg)),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("Database operation failed"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

/// Store messages name internal records, so only the status survives.
/// Handlers that can say more map the error themselves first.
impl From<ChirpyError> for AppError {
    fn from(err: ChirpyError) -> Self {
        match err {
            ChirpyError::NotFound(msg) => {
                tracing::debug!(error = %msg, "Store record not found");
                AppError::NotFound("Resource not found".to_string())
            }
            ChirpyError::Conflict(msg) => {
                tracing::debug!(error = %msg, "Store conflict");
                AppError::Conflict("Resource already exists".to_string())
            }
            ChirpyError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

impl From<crate::auth::PasswordError> for AppError {
    fn from(err: crate::auth::PasswordError) -> Self {
        AppError::Auth(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = body_of(AppError::NotFound("Chirp not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Chirp not found" }));
    }

    #[tokio::test]
    async fn test_database_detail_is_not_returned() {
        let (status, body) =
            body_of(ChirpyError::DatabaseError("relation does not exist".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database operation failed");
    }

    #[tokio::test]
    async fn test_store_detail_is_not_returned() {
        let user_id = uuid::Uuid::new_v4();
        let (status, body) = body_of(ChirpyError::NotFound(format!("user {user_id}")).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource not found");

        let (status, body) =
            body_of(ChirpyError::Conflict("user already exists".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Resource already exists");
    }

    #[tokio::test]
    async fn test_auth_errors_pass_through() {
        let (status, body) = body_of(AuthError::RefreshTokenRevoked.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Refresh token is revoked");
    }
}
