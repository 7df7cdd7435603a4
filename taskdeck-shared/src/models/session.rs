/// Session model: the per-user set of active bearer tokens
///
/// Each row records one live login. The raw JWT is never stored; only its
/// SHA-256 digest is, the same way API-style credentials are usually kept.
/// A bearer token therefore authenticates only while its digest row exists:
/// login inserts a row, logout deletes the presented token's row, logout-all
/// deletes every row for the user, and account deletion cascades.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, token_hash)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// One active login for a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex digest of the bearer token
    pub token_hash: String,

    /// When the session was opened
    pub created_at: DateTime<Utc>,
}

/// Hashes a bearer token for storage or lookup
///
/// Returns the lowercase SHA-256 hex digest (64 characters).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

impl Session {
    /// Records a new active token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// same token is recorded twice for one user (unique constraint).
    pub async fn create(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, token_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Checks whether a token is in the user's active set
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn exists(pool: &PgPool, user_id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM sessions WHERE user_id = $1 AND token_hash = $2",
        )
        .bind(user_id)
        .bind(hash_token(token))
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// Removes one token from the user's active set (logout)
    ///
    /// # Returns
    ///
    /// True if a session row was removed
    pub async fn delete(pool: &PgPool, user_id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token_hash = $2")
                .bind(user_id)
                .bind(hash_token(token))
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every token for the user (logout-all)
    ///
    /// # Returns
    ///
    /// Number of sessions closed
    pub async fn delete_all(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hash = hash_token("some-bearer-token");
        assert_eq!(hash.len(), 64); // SHA-256 hex
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
