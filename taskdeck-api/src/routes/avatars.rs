/// Avatar endpoints
///
/// Upload and removal are self-service; fetching is public so that
/// profile pictures can be embedded without credentials. Stored avatars
/// are always 250x250 PNG regardless of what was uploaded.
///
/// # Endpoints
///
/// - `POST /users/me/avatar` - Upload (multipart field `avatar`)
/// - `DELETE /users/me/avatar` - Remove own avatar
/// - `GET /users/:id/avatar` - Fetch any user's avatar (public)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
    routes::MessageResponse,
};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use taskdeck_shared::{images, models::user::User};
use uuid::Uuid;

/// Upload a new avatar for the caller
///
/// Expects a multipart body with a single part named `avatar`. The
/// filename extension must be jpg/jpeg/png and the part at most
/// 1,000,000 bytes; anything accepted is normalized to a 250x250 PNG
/// before storage, replacing any previous avatar.
///
/// # Errors
///
/// - `400 Bad Request`: missing part, bad extension, oversized, or not a
///   decodable image
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthSession,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        // Extension screen before touching the bytes.
        let file_name = field.file_name().unwrap_or_default();
        if !images::has_allowed_extension(file_name) {
            return Err(images::AvatarError::UnsupportedType.into());
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;

        let png = images::to_avatar_png(&data)?;

        if !User::set_avatar(&state.db, auth.user.id, &png).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        tracing::debug!(user_id = %auth.user.id, bytes = png.len(), "avatar stored");

        return Ok(Json(MessageResponse::new("Avatar uploaded")));
    }

    Err(ApiError::invalid_field(
        "avatar",
        "Expected a multipart field named 'avatar'",
    ))
}

/// Remove the caller's avatar
///
/// Removing an avatar that was never set still succeeds.
pub async fn delete_avatar(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<MessageResponse>> {
    if !User::clear_avatar(&state.db, auth.user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Avatar removed")))
}

/// Fetch a user's avatar (public)
///
/// Serves the stored PNG bytes. A missing user and a user without an
/// avatar both answer 404.
pub async fn fetch_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let png = User::find_avatar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Avatar not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
