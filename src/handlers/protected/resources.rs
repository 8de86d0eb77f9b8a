// handlers/protected/resources.rs - musician profile edits and reviews

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::records::{NewReview, ProfilePatch, Review, UserProfile};
use crate::state::AppState;

/// PUT /resources/:id - the musician themself
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(state.resources().update(&user, &id, patch).await?))
}

/// DELETE /resources/:id - the musician or an admin
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    state.resources().delete(&user, &id).await?;
    Ok(ApiResponse::deleted(id))
}

/// POST /resources/:id/reviews
pub async fn review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<NewReview>,
) -> ApiResult<Review> {
    Ok(ApiResponse::created(state.resources().add_review(&user, &id, input).await?))
}
