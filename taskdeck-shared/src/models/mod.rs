/// Database models for Taskdeck
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, profiles, and avatars
/// - `session`: The per-user set of active bearer tokens
/// - `task`: Owner-scoped tasks
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::{CreateUser, User};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "John Doe".to_string(),
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         age: None,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod session;
pub mod task;
pub mod user;
