//! Session management
//!
//! Login issues a short-lived access token plus a persisted refresh token;
//! refresh exchanges a live refresh token for a new access token; revoke
//! marks a refresh token unusable. Access tokens are never stored.

use super::error::AuthError;
use super::jwt::{access_token_ttl, generate_access_token, validate_access_token};
use super::password::{verify_password_blocking, PasswordError};
use super::refresh::{generate_refresh_token, REFRESH_TOKEN_TTL_DAYS};
use crate::audit::{audit_log, AuditEvent};
use chirpy_core::{AuthConfig, RefreshToken, RefreshTokenStore, User, UserStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Where a presented refresh token stands
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshTokenState {
    Active(RefreshToken),
    Expired(RefreshToken),
    Revoked(RefreshToken),
    NotFound,
}

impl RefreshTokenState {
    /// Classify a looked-up record at `now`
    ///
    /// A revocation mark wins over expiry.
    pub fn classify(record: Option<RefreshToken>, now: DateTime<Utc>) -> Self {
        match record {
            None => Self::NotFound,
            Some(record) if record.is_revoked() => Self::Revoked(record),
            Some(record) if record.is_expired_at(now) => Self::Expired(record),
            Some(record) => Self::Active(record),
        }
    }
}

/// Tokens issued by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
///
/// Secrets are injected through [`AuthConfig`] at construction.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    config: AuthConfig,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            config,
        }
    }

    fn secret(&self) -> &[u8] {
        self.config.jwt_secret.as_bytes()
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password fail identically. The access token
    /// lives for `expires_in_seconds` capped at one hour; the refresh token
    /// for 60 days. If the refresh token cannot be stored no tokens are
    /// returned.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expires_in_seconds: Option<i64>,
    ) -> Result<Session, AuthError> {
        let Some(user) = self.users.get_user_by_email(email).await? else {
            audit_log(&AuditEvent::LoginFailure {
                email: email.to_string(),
                reason: "unknown email".to_string(),
            });
            return Err(AuthError::InvalidCredentials);
        };

        match verify_password_blocking(password.to_string(), user.hashed_password.clone()).await {
            Ok(()) => {}
            Err(PasswordError::PasswordMismatch) => {
                audit_log(&AuditEvent::LoginFailure {
                    email: email.to_string(),
                    reason: "wrong password".to_string(),
                });
                return Err(AuthError::InvalidCredentials);
            }
            Err(PasswordError::InvalidHashFormat) => {
                tracing::warn!(user_id = %user.id, "Stored password hash is unreadable");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        }

        let access_token = generate_access_token(
            user.id,
            self.secret(),
            access_token_ttl(expires_in_seconds),
        )
        .map_err(AuthError::TokenIssue)?;

        let refresh_token = generate_refresh_token()?;
        let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);
        self.refresh_tokens
            .create_refresh_token(&refresh_token, user.id, expires_at)
            .await?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Look up a refresh token and classify it
    pub async fn lookup(&self, token: &str) -> Result<RefreshTokenState, AuthError> {
        let record = self.refresh_tokens.get_refresh_token(token).await?;
        Ok(RefreshTokenState::classify(record, Utc::now()))
    }

    /// Exchange a live refresh token for a new one-hour access token
    ///
    /// The refresh token itself is neither rotated nor extended.
    pub async fn refresh(&self, token: &str) -> Result<String, AuthError> {
        let record = match self.lookup(token).await? {
            RefreshTokenState::Active(record) => record,
            RefreshTokenState::Expired(_) => return Err(rejected(AuthError::RefreshTokenExpired)),
            RefreshTokenState::Revoked(_) => return Err(rejected(AuthError::RefreshTokenRevoked)),
            RefreshTokenState::NotFound => return Err(rejected(AuthError::RefreshTokenNotFound)),
        };

        let access_token =
            generate_access_token(record.user_id, self.secret(), access_token_ttl(None))
                .map_err(AuthError::TokenIssue)?;

        audit_log(&AuditEvent::TokenRefresh {
            user_id: record.user_id,
        });
        Ok(access_token)
    }

    /// Revoke a refresh token
    ///
    /// Expired records cannot be revoked, even if already revoked. Revoking
    /// a revoked record again succeeds and moves `revoked_at` forward.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let now = Utc::now();
        let record = match self.lookup(token).await? {
            RefreshTokenState::NotFound => return Err(rejected(AuthError::RefreshTokenNotFound)),
            RefreshTokenState::Expired(_) => return Err(rejected(AuthError::RefreshTokenExpired)),
            RefreshTokenState::Revoked(record) if record.is_expired_at(now) => {
                return Err(rejected(AuthError::RefreshTokenExpired))
            }
            RefreshTokenState::Active(record) | RefreshTokenState::Revoked(record) => record,
        };

        self.refresh_tokens
            .revoke_refresh_token(token)
            .await
            .map_err(|e| match e {
                // deleted between lookup and update
                chirpy_core::ChirpyError::NotFound(_) => AuthError::RefreshTokenNotFound,
                other => AuthError::Storage(other),
            })?;

        audit_log(&AuditEvent::TokenRevoked {
            user_id: record.user_id,
        });
        Ok(())
    }

    /// Verify an access token and return its user id
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError> {
        validate_access_token(access_token, self.secret()).map_err(|e| {
            audit_log(&AuditEvent::InvalidToken {
                reason: e.to_string(),
            });
            AuthError::InvalidToken(e)
        })
    }

    /// Check a partner API key against the configured one
    pub fn verify_api_key(&self, presented: &str) -> Result<(), AuthError> {
        if self.config.polka_key.is_empty() || presented != self.config.polka_key {
            audit_log(&AuditEvent::InvalidApiKey);
            return Err(AuthError::InvalidApiKey);
        }
        Ok(())
    }
}

fn rejected(err: AuthError) -> AuthError {
    audit_log(&AuditEvent::RefreshRejected {
        reason: err.to_string(),
    });
    err
}
