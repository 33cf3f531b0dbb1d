//! Authentication API handlers
//!
//! Login issues an access token and a refresh token; the refresh token is
//! then presented as a bearer credential to mint new access tokens or to be
//! revoked.
//!
//! Author: hephaex@gmail.com

use crate::auth::extract_bearer;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; capped at one hour
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

/// Login response: the user plus both tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
    /// Access token
    pub token: String,
    pub refresh_token: String,
}

/// Freshly minted access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Refresh and revoke read the refresh token from the header; a missing or
/// malformed header is the client's fault, not an authentication failure.
fn refresh_token_from(headers: &HeaderMap) -> Result<String, AppError> {
    extract_bearer(headers).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .sessions
        .login(&request.email, &request.password, request.expires_in_seconds)
        .await?;

    let user = session.user;
    Ok(Json(LoginResponse {
        id: user.id,
        created_at: user.created_at,
        updated_at: user.updated_at,
        email: user.email,
        is_chirpy_red: user.is_chirpy_red,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token is sent as `Authorization: Bearer <refresh token>`.
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 400, description = "Missing or malformed Authorization header", body = crate::error::ApiError),
        (status = 401, description = "Refresh token missing, expired or revoked", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = refresh_token_from(&headers)?;
    let token = state.sessions.refresh(&refresh_token).await?;

    Ok(Json(TokenResponse { token }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/revoke",
    tag = "auth",
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 400, description = "Missing or malformed Authorization header", body = crate::error::ApiError),
        (status = 401, description = "Refresh token missing or expired", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revoke_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = refresh_token_from(&headers)?;
    state.sessions.revoke(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
