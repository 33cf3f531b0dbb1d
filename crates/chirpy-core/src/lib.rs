//! Chirpy Core - Domain models, storage traits, and shared types
//!
//! This crate defines the core abstractions used throughout Chirpy:
//! - User, chirp and refresh token records
//! - Common error types
//! - Storage traits consumed by the API layer
//! - Configuration management
//! - PostgreSQL and in-memory store implementations

pub mod config;
pub mod memory;
pub mod postgres;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, Platform, ServerConfig,
};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Chirpy storage operations
#[derive(Error, Debug)]
pub enum ChirpyError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type Result<T> = std::result::Result<T, ChirpyError>;

// ============================================================================
// Domain Models
// ============================================================================

/// Registered account
///
/// The password hash never leaves the process; it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    /// Set by the partner upgrade webhook
    #[serde(default)]
    pub is_chirpy_red: bool,
}

/// Values needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
}

/// A short message posted by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Values needed to create a chirp
#[derive(Debug, Clone)]
pub struct NewChirp {
    pub body: String,
    pub user_id: Uuid,
}

/// Persisted refresh token record
///
/// The token string is the primary key. A record is bound to one user for its
/// whole life and is only ever mutated by revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Build a fresh, unrevoked record
    pub fn new(token: impl Into<String>, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        }
    }

    /// A token is expired from the instant `expires_at` is reached
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// User persistence
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with `Conflict` when the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a user by id
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Replace a user's email and password hash
    async fn update_user(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User>;

    /// Mark a user as a Chirpy Red member
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User>;

    /// Delete every user, cascading to their chirps and refresh tokens
    async fn delete_all_users(&self) -> Result<()>;
}

/// Chirp persistence
#[async_trait::async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<Chirp>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>>;

    /// List chirps oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>>;

    /// Delete a chirp; fails with `NotFound` when it does not exist
    async fn delete_chirp(&self, id: Uuid) -> Result<()>;
}

/// Refresh token persistence, keyed by the token string
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    /// Stamp `revoked_at` with the current time in a single keyed update.
    ///
    /// Fails with `NotFound` when no record has this token.
    async fn revoke_refresh_token(&self, token: &str) -> Result<()>;
}

/// Convenience bound for a backend that implements every store
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {}

impl<T: UserStore + ChirpStore + RefreshTokenStore> Store for T {}

// ============================================================================
// Tests
// ============================================================================
