// handlers/protected/users.rs - /users/me

use axum::{extract::State, Extension};

use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::records::UserProfile;
use crate::services::ProfileUpdate;
use crate::state::AppState;

/// PUT /users/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(state.users().update_me(&user, update).await?))
}

/// DELETE /users/me
pub async fn delete_me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Deleted> {
    state.users().delete_me(&user).await?;
    Ok(ApiResponse::deleted(user.subject))
}
