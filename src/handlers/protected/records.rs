// handlers/protected/records.rs - /appointments and /incidencias
//
// Generic over the record type; routed as e.g. `get(records::list::<Appointment>)`.

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::handlers::{JsonBody, ListParams};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::pagination::Page;
use crate::records::OwnedRecord;
use crate::state::AppState;

/// GET /<collection> - the caller's records, newest first, with totals
pub async fn list<R: OwnedRecord>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<R>> {
    let pagination = &state.config.pagination;
    let request = params.into_request(pagination.default_limit, pagination);
    Ok(ApiResponse::success(state.records::<R>().list_for_owner(&user, request).await?))
}

/// POST /<collection>
pub async fn create<R: OwnedRecord>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<R::New>,
) -> ApiResult<R> {
    Ok(ApiResponse::created(state.records::<R>().create(&user, input).await?))
}

/// GET /<collection>/:id
pub async fn show<R: OwnedRecord>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<R> {
    Ok(ApiResponse::success(state.records::<R>().get(&id).await?))
}

/// PUT /<collection>/:id - owner only
pub async fn update<R: OwnedRecord>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<R::Patch>,
) -> ApiResult<R> {
    Ok(ApiResponse::success(state.records::<R>().update(&user, &id, patch).await?))
}

/// DELETE /<collection>/:id - owner or admin
pub async fn delete<R: OwnedRecord>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    state.records::<R>().delete(&user, &id).await?;
    Ok(ApiResponse::deleted(id))
}
