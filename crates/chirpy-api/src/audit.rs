//! Security audit logging for authentication events
//!
//! Every event is logged at INFO level on the `audit` target so it can be
//! filtered and routed separately from application logs. Events never carry
//! passwords, hashes, tokens or API keys.
//!
//! # Example
//!
//! ```ignore
//! use chirpy_api::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id,
//!     email: user.email.clone(),
//! });
//! ```
//!
//! Author: hephaex@gmail.com

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Account created
    Registration { user_id: Uuid, email: String },

    /// Credentials accepted and a session issued
    LoginSuccess { user_id: Uuid, email: String },

    /// Credentials rejected
    LoginFailure { email: String, reason: String },

    /// New access token issued from a refresh token
    TokenRefresh { user_id: Uuid },

    /// Refresh token revoked
    TokenRevoked { user_id: Uuid },

    /// Refresh token presented in a terminal state
    RefreshRejected { reason: String },

    /// Access token failed verification
    InvalidToken { reason: String },

    /// Webhook presented the wrong partner key
    InvalidApiKey,

    /// Account upgraded to Chirpy Red by the payment partner
    AccountUpgraded { user_id: Uuid },
}

impl AuditEvent {
    fn message(&self) -> &'static str {
        match self {
            AuditEvent::Registration { .. } => "User registered",
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::TokenRefresh { .. } => "Token refresh",
            AuditEvent::TokenRevoked { .. } => "Refresh token revoked",
            AuditEvent::RefreshRejected { .. } => "Refresh token rejected",
            AuditEvent::InvalidToken { .. } => "Invalid access token",
            AuditEvent::InvalidApiKey => "Invalid API key",
            AuditEvent::AccountUpgraded { .. } => "Account upgraded",
        }
    }
}

/// Log a security audit event
///
/// The event is serialized to JSON and attached as the `event` field:
///
/// ```json
/// {"event_type":"login_success","user_id":"550e8400-e29b-41d4-a716-446655440000","email":"user@example.com"}
/// ```
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(
        target: "audit",
        timestamp = %timestamp,
        event = %event_json,
        "{}",
        event.message()
    );
}
