//! Request authentication for handlers
//!
//! Handlers that take an [`AuthenticatedUser`] argument only run when the
//! request carries `Authorization: Bearer <access token>` with a valid token.
//! [`PartnerKey`] does the same for `Authorization: ApiKey <key>`. A missing,
//! malformed or invalid credential is rejected with 401.
//!
//! Both are request-parts extractors, so they run before the body is read.
use super::error::AuthError;
use super::header::{extract_api_key, extract_bearer};
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use uuid::Uuid;

/// Caller identity taken from a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        let user_id = state.sessions.authenticate(&token)?;
        Ok(Self { user_id })
    }
}

/// Proof that the request carried the configured partner API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerKey;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for PartnerKey {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_api_key(&parts.headers)?;
        state.sessions.verify_api_key(&key)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use chirpy_core::{AppConfig, AuthConfig, MemoryStore};

    fn state() -> Arc<AppState> {
        let config = AppConfig {
            auth: AuthConfig::new("extractor-secret", "key"),
            ..Default::default()
        };
        Arc::new(AppState::new(config, Arc::new(MemoryStore::new())))
    }

    async fn extract(state: &Arc<AppState>, auth: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let mut builder = Request::builder().uri("/api/chirps");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_token() {
        let state = state();
        let user_id = Uuid::new_v4();
        let token =
            generate_access_token(user_id, b"extractor-secret", chrono::Duration::minutes(5)).unwrap();

        let user = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_rejections_are_unauthorized() {
        let state = state();
        for auth in [None, Some("Bearer"), Some("Basic abc"), Some("Bearer not-a-jwt")] {
            let err = extract(&state, auth).await.unwrap_err();
            assert_eq!(
                err.into_response().status(),
                StatusCode::UNAUTHORIZED,
                "auth = {auth:?}"
            );
        }
    }

    async fn partner(state: &Arc<AppState>, auth: Option<&str>) -> Result<PartnerKey, AuthError> {
        let mut builder = Request::builder().uri("/api/polka/webhooks");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        PartnerKey::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_partner_key() {
        let state = state();
        assert_eq!(partner(&state, Some("ApiKey key")).await.unwrap(), PartnerKey);

        for auth in [None, Some("ApiKey"), Some("Bearer key"), Some("ApiKey wrong")] {
            let err = partner(&state, auth).await.unwrap_err();
            assert_eq!(
                err.into_response().status(),
                StatusCode::UNAUTHORIZED,
                "auth = {auth:?}"
            );
        }
    }
}
