//! PostgreSQL store
//!
//! Users, chirps and refresh tokens on SQLx and PostgreSQL. Every operation is
//! a single statement, so single-row updates are atomic on the server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    Chirp, ChirpStore, ChirpyError, NewChirp, NewUser, RefreshToken, RefreshTokenStore, Result,
    User, UserStore,
};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store connection
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| ChirpyError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

        tracing::info!(max_connections, "PostgreSQL pool created");
        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        let migrator = sqlx::migrate!("./migrations");
        tracing::info!(migrations = migrator.iter().count(), "Running schema migrations");

        migrator
            .run(&self.pool)
            .await
            .map_err(|e| ChirpyError::DatabaseError(format!("Migration failed: {e}")))?;

        tracing::debug!("Schema migrations applied");
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: String,
    hashed_password: String,
    is_chirpy_red: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            email: row.email,
            hashed_password: row.hashed_password,
            is_chirpy_red: row.is_chirpy_red,
        }
    }
}

/// Chirp row from database
#[derive(Debug, FromRow)]
struct ChirpRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    body: String,
    user_id: Uuid,
}

impl From<ChirpRow> for Chirp {
    fn from(row: ChirpRow) -> Self {
        Chirp {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            body: row.body,
            user_id: row.user_id,
        }
    }
}

/// Refresh token row from database
#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            token: row.token,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> ChirpyError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ChirpyError::Conflict(format!("{what} already exists"))
        }
        _ => ChirpyError::DatabaseError(format!("Failed to write {what}: {err}")),
    }
}

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";
const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";
const REFRESH_TOKEN_COLUMNS: &str =
    "token, user_id, created_at, updated_at, expires_at, revoked_at";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, NOW(), NOW(), $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        Ok(row.into())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ChirpyError::DatabaseError(format!("Failed to get user: {e}")))?;

        Ok(row.map(User::from))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ChirpyError::DatabaseError(format!("Failed to get user: {e}")))?;

        Ok(row.map(User::from))
    }

    async fn update_user(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        row.map(User::from)
            .ok_or_else(|| ChirpyError::NotFound(format!("user {id}")))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET is_chirpy_red = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChirpyError::DatabaseError(format!("Failed to upgrade user: {e}")))?;

        row.map(User::from)
            .ok_or_else(|| ChirpyError::NotFound(format!("user {id}")))
    }

    async fn delete_all_users(&self) -> Result<()> {
        // chirps and refresh_tokens cascade
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| ChirpyError::DatabaseError(format!("Failed to delete users: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<Chirp> {
        let row: ChirpRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, NOW(), NOW(), $2, $3)
            RETURNING {CHIRP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&chirp.body)
        .bind(chirp.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ChirpyError::NotFound(format!("user {}", chirp.user_id))
            }
            _ => ChirpyError::DatabaseError(format!("Failed to create chirp: {e}")),
        })?;

        Ok(row.into())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        let row: Option<ChirpRow> =
            sqlx::query_as(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ChirpyError::DatabaseError(format!("Failed to get chirp: {e}")))?;

        Ok(row.map(Chirp::from))
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>> {
        let rows: Vec<ChirpRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CHIRP_COLUMNS}
            FROM chirps
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChirpyError::DatabaseError(format!("Failed to list chirps: {e}")))?;

        Ok(rows.into_iter().map(Chirp::from).collect())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChirpyError::DatabaseError(format!("Failed to delete chirp: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(ChirpyError::NotFound(format!("chirp {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken> {
        let row: RefreshTokenRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, NOW(), NOW(), $3)
            RETURNING {REFRESH_TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "refresh token"))?;

        Ok(row.into())
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChirpyError::DatabaseError(format!("Failed to get refresh token: {e}")))?;

        Ok(row.map(RefreshToken::from))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW(), updated_at = NOW() WHERE token = $1",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| ChirpyError::DatabaseError(format!("Failed to revoke refresh token: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(ChirpyError::NotFound("refresh token".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_row_conversion() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let row = RefreshTokenRow {
            token: "ab".repeat(32),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now,
            revoked_at: None,
        };

        let token = RefreshToken::from(row);
        assert_eq!(token.token.len(), 64);
        assert_eq!(token.user_id, user_id);
        assert!(!token.is_revoked());
    }

    #[test]
    fn test_user_row_conversion_keeps_hash() {
        let now = Utc::now();
        let user = User::from(UserRow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: "saul@bettercall.com".to_string(),
            hashed_password: "hash".to_string(),
            is_chirpy_red: true,
        });

        assert_eq!(user.hashed_password, "hash");
        assert!(user.is_chirpy_red);
    }
}
