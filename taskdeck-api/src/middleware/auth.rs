/// Authentication gate applied to every protected route
///
/// The gate resolves a `(user, token)` pair or rejects with 401. A request
/// authenticates only when all of the following hold:
///
/// 1. `Authorization: Bearer <token>` is present
/// 2. the token's signature and expiry check out
/// 3. a user exists for the token's `sub` claim
/// 4. the token is still in that user's active session set
///
/// Steps 1-2 run before any database access, so requests with missing or
/// garbage tokens never touch storage. The gate is an extractor: a handler
/// opts in by taking an [`AuthSession`] argument, and any route without one
/// stays public. The gate never mutates the session set and nothing is
/// cached, each request re-verifies.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use taskdeck_shared::{auth::jwt, models::session::Session, models::user::User};

use crate::{app::AppState, error::ApiError};

/// Resolved identity for the current request
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user, freshly loaded
    pub user: User,

    /// The raw bearer token the request presented
    pub token: String,
}

impl AuthSession {
    /// Rejects non-admin callers with 403
    ///
    /// Object-level misses (a task someone else owns) are reported as 404
    /// elsewhere; 403 is reserved for role checks, where the route itself
    /// is off limits and hiding that tells the caller nothing useful.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.user.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Administrator access required".to_string()))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Please authenticate".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))?;

        // Signature and expiry first; no database work for garbage tokens.
        let claims = jwt::validate_token(token, state.jwt_secret())?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Please authenticate".to_string()))?;

        // A signed token is worthless once logged out.
        if !Session::exists(&state.db, user.id, token).await? {
            return Err(ApiError::Unauthorized("Please authenticate".to_string()));
        }

        Ok(AuthSession {
            user,
            token: token.to_string(),
        })
    }
}
