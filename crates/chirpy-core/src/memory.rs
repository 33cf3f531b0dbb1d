//! In-memory store
//!
//! Used for local development without PostgreSQL and as the backend for
//! tests. All tables sit behind one lock so cascading deletes and single-row
//! updates are atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Chirp, ChirpStore, ChirpyError, NewChirp, NewUser, RefreshToken, RefreshTokenStore, Result,
    User, UserStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // insertion order doubles as creation order
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// Process-local store implementing every storage trait
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a refresh token record as-is
    ///
    /// Lets callers seed records with arbitrary timestamps.
    pub async fn put_refresh_token(&self, record: RefreshToken) {
        let mut tables = self.tables.write().await;
        tables.refresh_tokens.insert(record.token.clone(), record);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(ChirpyError::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: user.email,
            hashed_password: user.hashed_password,
            is_chirpy_red: false,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_user(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(ChirpyError::Conflict("user already exists".to_string()));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| ChirpyError::NotFound(format!("user {id}")))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| ChirpyError::NotFound(format!("user {id}")))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_all_users(&self) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.chirps.clear();
        tables.refresh_tokens.clear();
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<Chirp> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&chirp.user_id) {
            return Err(ChirpyError::NotFound(format!("user {}", chirp.user_id)));
        }

        let now = Utc::now();
        let created = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: chirp.body,
            user_id: chirp.user_id,
        };
        tables.chirps.push(created.clone());
        Ok(created)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        let tables = self.tables.read().await;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>> {
        let tables = self.tables.read().await;
        let mut chirps: Vec<Chirp> = tables
            .chirps
            .iter()
            .filter(|c| author_id.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        if tables.chirps.len() == before {
            return Err(ChirpyError::NotFound(format!("chirp {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken> {
        let mut tables = self.tables.write().await;
        if tables.refresh_tokens.contains_key(token) {
            return Err(ChirpyError::Conflict("refresh token already exists".to_string()));
        }

        let record = RefreshToken::new(token, user_id, expires_at);
        tables
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let tables = self.tables.read().await;
        Ok(tables.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .refresh_tokens
            .get_mut(token)
            .ok_or_else(|| ChirpyError::NotFound("refresh token".to_string()))?;
        let now = Utc::now();
        record.revoked_at = Some(now);
        record.updated_at = now;
        Ok(())
    }
}
