/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Account lifecycle (signup, login, profile, admin)
/// - `tasks`: Owner-scoped task CRUD
/// - `avatars`: Avatar upload, removal, and public fetch

use serde::{Deserialize, Serialize};

pub mod avatars;
pub mod health;
pub mod tasks;
pub mod users;

/// Plain acknowledgement body for endpoints with nothing else to say
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
