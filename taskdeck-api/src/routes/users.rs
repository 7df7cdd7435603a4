/// Account endpoints
///
/// This module provides the account lifecycle:
/// - Signup and login (public)
/// - Session revocation (logout, logout-all)
/// - Self-service profile read/update/delete
/// - Admin listing, inspection, and deletion of any account
///
/// # Endpoints
///
/// - `POST /users` - Sign up (201, welcome email)
/// - `POST /users/login` - Log in, open a new session
/// - `POST /users/logout` - Revoke the presented token
/// - `POST /users/logoutAll` - Revoke every session
/// - `GET /users/me` - Own profile
/// - `PATCH /users/me` - Update own profile (whitelisted fields)
/// - `DELETE /users/me` - Delete own account (cascade, farewell email)
/// - `GET /users` - List accounts (admin)
/// - `GET /users/:id` - Fetch one account (admin)
/// - `DELETE /users/:id` - Delete one account (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_shared::{
    auth::{jwt, password},
    email,
    models::{
        session::Session,
        user::{CreateUser, UpdateUser, User, UserProfile},
    },
};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

/// Fields a profile PATCH may touch. Anything else rejects the whole
/// request.
const ALLOWED_USER_UPDATES: &[&str] = &["name", "email", "password", "age"];

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password (strength-checked separately)
    pub password: String,

    /// Optional age
    #[validate(range(min = 0, message = "Age must be non-negative"))]
    pub age: Option<i32>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Body returned by signup and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The account, in its public shape
    pub user: UserProfile,

    /// Fresh bearer token for this session
    pub token: String,
}

/// Sign up a new account
///
/// Creates the account, opens its first session, and fires the welcome
/// email without waiting for delivery.
///
/// # Errors
///
/// - `400 Bad Request`: validation or password strength failed, or the
///   email is already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Name is required"));
    }
    let email = req.email.trim().to_lowercase();

    password::validate_password_strength(&req.password)
        .map_err(|msg| ApiError::invalid_field("password", &msg))?;
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
            age: req.age,
        },
    )
    .await?;

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;
    Session::create(&state.db, user.id, &token).await?;

    email::dispatch(
        state.mailer.clone(),
        email::welcome_email(&user.email, &user.name),
    );

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserProfile::from(&user),
            token,
        }),
    ))
}

/// Log in and open a new session
///
/// Each login mints a fresh token and appends it to the active set, so
/// multiple devices stay logged in independently.
///
/// # Errors
///
/// - `400 Bad Request`: unknown email or wrong password (deliberately
///   indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let email = req.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Unable to login".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::BadRequest("Unable to login".to_string()));
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;
    Session::create(&state.db, user.id, &token).await?;

    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

/// Revoke the session the request authenticated with
///
/// Other sessions for the same user stay valid.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<MessageResponse>> {
    Session::delete(&state.db, auth.user.id, &auth.token).await?;

    Ok(Json(MessageResponse::new("Logged out")))
}

/// Revoke every session for the caller
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<MessageResponse>> {
    let closed = Session::delete_all(&state.db, auth.user.id).await?;
    tracing::debug!(user_id = %auth.user.id, closed, "closed all sessions");

    Ok(Json(MessageResponse::new("Logged out everywhere")))
}

/// Return the caller's own profile
pub async fn read_profile(auth: AuthSession) -> Json<UserProfile> {
    Json(UserProfile::from(&auth.user))
}

/// Update the caller's own profile
///
/// The body is inspected as raw JSON so that a request naming any field
/// outside the whitelist (name, email, password, age) is rejected whole
/// with 400 and nothing is written. Password changes are strength-checked
/// and re-hashed.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<serde_json::Map<String, Value>>,
) -> ApiResult<Json<UserProfile>> {
    if let Some(key) = body
        .keys()
        .find(|key| !ALLOWED_USER_UPDATES.contains(&key.as_str()))
    {
        return Err(ApiError::BadRequest(format!(
            "Invalid updates: '{key}' cannot be updated"
        )));
    }

    let mut update = UpdateUser::default();

    if let Some(value) = body.get("name") {
        let name = value
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::invalid_field("name", "Name must be a non-empty string"))?;
        update.name = Some(name.to_string());
    }

    if let Some(value) = body.get("email") {
        let email = value
            .as_str()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| email.validate_email())
            .ok_or_else(|| ApiError::invalid_field("email", "Invalid email format"))?;
        update.email = Some(email);
    }

    if let Some(value) = body.get("age") {
        let age = value
            .as_i64()
            .and_then(|age| i32::try_from(age).ok())
            .filter(|age| *age >= 0)
            .ok_or_else(|| {
                ApiError::invalid_field("age", "Age must be a non-negative integer")
            })?;
        update.age = Some(age);
    }

    if let Some(value) = body.get("password") {
        let plaintext = value
            .as_str()
            .ok_or_else(|| ApiError::invalid_field("password", "Password must be a string"))?;
        password::validate_password_strength(plaintext)
            .map_err(|msg| ApiError::invalid_field("password", &msg))?;
        update.password_hash = Some(password::hash_password(plaintext)?);
    }

    let user = User::update(&state.db, auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

/// Delete the caller's own account
///
/// Sessions and owned tasks go with it atomically (FK cascade). The
/// farewell email fires after the delete and never affects the response.
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<UserProfile>> {
    let user = User::delete(&state.db, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    email::dispatch(
        state.mailer.clone(),
        email::farewell_email(&user.email, &user.name),
    );

    tracing::info!(user_id = %user.id, "account deleted");

    Ok(Json(UserProfile::from(&user)))
}

/// List all accounts (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<Vec<UserProfile>>> {
    auth.require_admin()?;

    let users = User::list(&state.db).await?;

    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// Fetch one account by id (admin only)
pub async fn read_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    auth.require_admin()?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

/// Delete any account by id (admin only)
///
/// Same cascade as self-deletion; the farewell email is reserved for the
/// user closing their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    auth.require_admin()?;

    let user = User::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, admin_id = %auth.user.id, "account deleted by admin");

    Ok(Json(UserProfile::from(&user)))
}
