// handlers/public/resources.rs - public musician catalogue

use axum::extract::{Path, Query, State};

use crate::handlers::ListParams;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::Page;
use crate::records::profile::ResourceDetail;
use crate::records::{Review, UserProfile};
use crate::state::AppState;

/// GET /resources
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Page<UserProfile>> {
    let pagination = &state.config.pagination;
    let request = params.into_request(pagination.admin_default_limit, pagination);
    Ok(ApiResponse::success(state.resources().list(request).await?))
}

/// GET /resources/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ResourceDetail> {
    Ok(ApiResponse::success(state.resources().get(&id).await?))
}

/// GET /resources/:id/reviews
pub async fn reviews(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Review>> {
    Ok(ApiResponse::success(state.resources().reviews(&id).await?))
}
