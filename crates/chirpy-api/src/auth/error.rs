//! Authentication error taxonomy
//!
//! Author: hephaex@gmail.com

use super::header::HeaderError;
use super::jwt::JwtError;
use super::password::PasswordError;
use super::refresh::EntropyError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chirpy_core::ChirpyError;
use thiserror::Error;

/// Authentication and session errors
///
/// Credential failures map to 401 with a message safe to return. Everything
/// else is an infrastructure failure: the cause is logged and the client sees
/// a generic 500.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid access token: {0}")]
    InvalidToken(JwtError),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("Refresh token does not exist")]
    RefreshTokenNotFound,

    #[error("Refresh token is expired")]
    RefreshTokenExpired,

    #[error("Refresh token is revoked")]
    RefreshTokenRevoked,

    #[error("Failed to issue access token: {0}")]
    TokenIssue(JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error("Storage error: {0}")]
    Storage(#[from] ChirpyError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::InvalidApiKey
            | AuthError::Header(_)
            | AuthError::RefreshTokenNotFound
            | AuthError::RefreshTokenExpired
            | AuthError::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::TokenIssue(_)
            | AuthError::Password(_)
            | AuthError::Entropy(_)
            | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client
    pub fn public_message(&self) -> String {
        match self {
            // verification detail stays in the logs
            AuthError::InvalidToken(_) => "Invalid or expired token".to_string(),
            err if err.status_code().is_server_error() => "Internal server error".to_string(),
            err => err.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication failure");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}
