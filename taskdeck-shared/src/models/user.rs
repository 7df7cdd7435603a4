/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing
/// accounts. Passwords are stored as Argon2id hashes, never in plaintext,
/// and neither the hash nor the avatar blob appears in the JSON profile
/// representation ([`UserProfile`]).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('member', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     age INTEGER CHECK (age >= 0),
///     role user_role NOT NULL DEFAULT 'member',
///     avatar BYTEA,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The avatar column is intentionally absent from [`User`]: avatar bytes are
/// only ever read through [`User::find_avatar`] so that profile queries never
/// drag a binary blob across the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Columns selected for the `User` struct. Keep in sync with the schema;
/// `avatar` is deliberately excluded.
const USER_COLUMNS: &str = "id, name, email, password_hash, age, role, created_at, updated_at";

/// Role attached to a user account
///
/// Replaces an equality check against a well-known administrator email with
/// an explicit claim on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account; may only act on its own resources
    Member,

    /// May list, inspect, and delete any account
    Admin,
}

/// User model representing an account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name (required, stored trimmed)
    pub name: String,

    /// Email address (unique, stored lowercase)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional age, non-negative
    pub age: Option<i32>,

    /// Account role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Public JSON representation of a user
///
/// This is the only user shape handlers serialize. The password hash and
/// avatar bytes never leave the server through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name (already trimmed)
    pub name: String,

    /// Email address (already lowercased)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Optional age
    pub age: Option<i32>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address (already lowercased)
    pub email: Option<String>,

    /// New age
    pub age: Option<i32>,

    /// New password hash (re-hashed by the caller before it gets here)
    pub password_hash: Option<String>,
}

impl User {
    /// Returns true when this account carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Creates a new user in the database
    ///
    /// New accounts always start as [`UserRole::Member`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, age) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.age)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Emails are stored lowercase; callers normalize before lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only `Some` fields in `data` are written. The `updated_at` timestamp
    /// is set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${bind_count}"));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${bind_count}"));
        }
        if data.age.is_some() {
            bind_count += 1;
            query.push_str(&format!(", age = ${bind_count}"));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(age) = data.age {
            q = q.bind(age);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by ID, returning the deleted record
    ///
    /// Sessions and owned tasks go with it via `ON DELETE CASCADE`, so a
    /// single statement removes the account and everything it owns
    /// atomically.
    ///
    /// # Returns
    ///
    /// The deleted user if found, None if the user didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Lists all users, ordered by creation date (oldest first)
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");

        let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;

        Ok(users)
    }

    /// Stores the processed avatar bytes for a user, overwriting any
    /// previous value
    ///
    /// # Returns
    ///
    /// True if the user exists and was updated
    pub async fn set_avatar(pool: &PgPool, id: Uuid, png: &[u8]) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(png)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the avatar for a user
    ///
    /// # Returns
    ///
    /// True if the user exists and was updated
    pub async fn clear_avatar(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET avatar = NULL, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches the stored avatar bytes for a user
    ///
    /// # Returns
    ///
    /// The PNG bytes, or None when the user does not exist or has no avatar.
    /// Callers cannot tell those two cases apart, which is exactly the
    /// contract the public avatar endpoint wants.
    pub async fn find_avatar(pool: &PgPool, id: Uuid) -> Result<Option<Vec<u8>>, sqlx::Error> {
        let row: Option<(Option<Vec<u8>>,)> =
            sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(row.and_then(|(avatar,)| avatar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            age: Some(30),
            role: UserRole::Member,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
        assert!(json.contains("test@example.com"));
    }

    #[test]
    fn test_profile_omits_absent_age() {
        let user = User {
            id: Uuid::new_v4(),
            name: "No Age".to_string(),
            email: "noage@example.com".to_string(),
            password_hash: "hash".to_string(),
            age: None,
            role: UserRole::Member,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();
        assert!(!json.contains("age"));
    }

    #[test]
    fn test_is_admin() {
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "hash".to_string(),
            age: None,
            role: UserRole::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(user.is_admin());

        user.role = UserRole::Member;
        assert!(!user.is_admin());
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.age.is_none());
        assert!(update.password_hash.is_none());
    }

    // Integration tests for the database operations are in taskdeck-api/tests.
}
