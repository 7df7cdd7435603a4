//! # Taskdeck Shared Library
//!
//! This crate contains the types and business logic shared between the
//! Taskdeck API server and its integration tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, sessions, tasks)
//! - `auth`: Password hashing and bearer-token primitives
//! - `db`: Connection pool and migration runner
//! - `email`: Transactional email delivery
//! - `images`: Avatar upload processing

pub mod auth;
pub mod db;
pub mod email;
pub mod images;
pub mod models;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
