// handlers/elevated/records.rs - /admin/appointments and /admin/incidencias

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::handlers::ListParams;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::pagination::Page;
use crate::records::{AdminEntry, OwnedRecord};
use crate::state::AppState;

/// GET /admin/<collection> - every owner's records, labelled with `userName`
pub async fn list<R: OwnedRecord>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<AdminEntry<R>>> {
    let pagination = &state.config.pagination;
    let request = params.into_request(pagination.admin_default_limit, pagination);
    Ok(ApiResponse::success(state.records::<R>().list_all(request).await?))
}

/// DELETE /admin/<collection>/:id
pub async fn delete<R: OwnedRecord>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    state.records::<R>().admin_delete(&user, &id).await?;
    Ok(ApiResponse::deleted(id))
}
