//! Chirp handlers
//!
//! Author: hephaex@gmail.com

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chirpy_core::{Chirp, ChirpyError, NewChirp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Longest accepted chirp, in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Create chirp request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Chirp as returned by the API
///
/// Timestamps are camelCase on the wire while `user_id` is not; clients
/// already depend on this mix.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChirpResponse {
    pub id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

/// Query parameters for listing chirps
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListChirpsQuery {
    /// Only chirps by this user
    pub author_id: Option<String>,
    /// `asc` (default) or `desc` by creation time
    pub sort: Option<String>,
}

/// Replace profane words with `****`
///
/// Words are split on single spaces and compared case-insensitively, so
/// `Fornax!` survives while `FORNAX` does not.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {what}")))
}

/// Post a chirp as the authenticated user
#[utoipa::path(
    post,
    path = "/api/chirps",
    tag = "chirps",
    request_body = CreateChirpRequest,
    responses(
        (status = 201, description = "Chirp created", body = ChirpResponse),
        (status = 400, description = "Chirp is too long", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    AppJson(request): AppJson<CreateChirpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::BadRequest("Chirp is too long".to_string()));
    }

    let chirp = state
        .store
        .create_chirp(NewChirp {
            body: clean_body(&request.body),
            user_id: caller.user_id,
        })
        .await
        .map_err(|e| match e {
            ChirpyError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    tracing::debug!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Chirp created");
    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

/// List chirps, optionally filtered by author
#[utoipa::path(
    get,
    path = "/api/chirps",
    tag = "chirps",
    params(ListChirpsQuery),
    responses(
        (status = 200, description = "Chirps", body = [ChirpResponse]),
        (status = 400, description = "Invalid author_id or sort", body = crate::error::ApiError),
    )
)]
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_id(raw, "author_id")?),
    };

    let descending = match query.sort.as_deref() {
        None | Some("") | Some("asc") => false,
        Some("desc") => true,
        Some(_) => return Err(AppError::BadRequest("Invalid sort order".to_string())),
    };

    let mut chirps = state.store.list_chirps(author_id).await?;
    if descending {
        chirps.reverse();
    }

    let response: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(response))
}

/// Get a single chirp
#[utoipa::path(
    get,
    path = "/api/chirps/{chirp_id}",
    tag = "chirps",
    params(
        ("chirp_id" = String, Path, description = "Chirp ID")
    ),
    responses(
        (status = 200, description = "Chirp", body = ChirpResponse),
        (status = 404, description = "Chirp not found", body = crate::error::ApiError),
    )
)]
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let chirp_id = parse_id(&chirp_id, "chirp ID")?;
    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

/// Delete one of the caller's chirps
#[utoipa::path(
    delete,
    path = "/api/chirps/{chirp_id}",
    tag = "chirps",
    params(
        ("chirp_id" = String, Path, description = "Chirp ID")
    ),
    responses(
        (status = 204, description = "Chirp deleted"),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 403, description = "Not the author", body = crate::error::ApiError),
        (status = 404, description = "Chirp not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let chirp_id = parse_id(&chirp_id, "chirp ID")?;
    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    if chirp.user_id != caller.user_id {
        return Err(AppError::Forbidden(
            "Cannot delete chirps of other users".to_string(),
        ));
    }

    state.store.delete_chirp(chirp_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
