//! User account handlers
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditEvent};
use crate::auth::{hash_password_blocking, AuthenticatedUser};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chirpy_core::{ChirpyError, NewUser, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Email and password, used to register and to update an account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Turn validator output into a 400 carrying the first message
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string());
    AppError::BadRequest(message)
}

fn email_taken(err: ChirpyError) -> AppError {
    match err {
        ChirpyError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
        other => other.into(),
    }
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "Email already registered", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let hashed_password = hash_password_blocking(request.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            email: request.email,
            hashed_password,
        })
        .await
        .map_err(email_taken)?;

    audit_log(&AuditEvent::Registration {
        user_id: user.id,
        email: user.email.clone(),
    });

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Change the caller's own email and password
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "users",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 409, description = "Email already registered", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    AppJson(request): AppJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let hashed_password = hash_password_blocking(request.password).await?;
    let user = state
        .store
        .update_user(caller.user_id, &request.email, &hashed_password)
        .await
        .map_err(email_taken)?;

    Ok(Json(UserResponse::from(user)))
}
