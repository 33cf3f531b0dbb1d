//! Payment partner webhook
//!
//! Polka notifies us when a user pays for Chirpy Red. Requests carry
//! `Authorization: ApiKey <key>`.
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditEvent};
use crate::auth::PartnerKey;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chirpy_core::ChirpyError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// The only event we act on
pub const USER_UPGRADED: &str = "user.upgraded";

/// Webhook payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WebhookData {
    pub user_id: Option<Uuid>,
}

/// Receive a partner event
///
/// The key is checked before the body is decoded.
#[utoipa::path(
    post,
    path = "/api/polka/webhooks",
    tag = "webhooks",
    request_body = WebhookRequest,
    responses(
        (status = 204, description = "Event handled or ignored"),
        (status = 400, description = "Invalid body or missing user id", body = crate::error::ApiError),
        (status = 401, description = "Missing or wrong API key", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    _partner: PartnerKey,
    AppJson(request): AppJson<WebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.event != USER_UPGRADED {
        tracing::debug!(event = %request.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = request
        .data
        .user_id
        .ok_or_else(|| AppError::BadRequest("Missing user_id".to_string()))?;

    state
        .store
        .upgrade_to_chirpy_red(user_id)
        .await
        .map_err(|e| match e {
            ChirpyError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    audit_log(&AuditEvent::AccountUpgraded { user_id });
    Ok(StatusCode::NO_CONTENT)
}
