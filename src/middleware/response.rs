use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

/// Success body `{"success": true, "data": ...}` with its status
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status: StatusCode,
}

/// Acknowledgement returned by every delete endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status: StatusCode::OK }
    }

    /// 201, for anything a POST stored
    pub fn created(data: T) -> Self {
        Self { data, status: StatusCode::CREATED }
    }
}

impl ApiResponse<Deleted> {
    pub fn deleted(id: impl Into<String>) -> Self {
        Self::success(Deleted { id: id.into(), deleted: true })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(data) => (self.status, Json(json!({ "success": true, "data": data }))).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to format response").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_status() {
        assert_eq!(ApiResponse::created(1).status, StatusCode::CREATED);
        assert_eq!(ApiResponse::success(1).status, StatusCode::OK);
    }

    #[test]
    fn deleted_acknowledges_the_id() {
        let response = ApiResponse::deleted("abc");
        assert_eq!(
            serde_json::to_value(&response.data).unwrap(),
            json!({ "id": "abc", "deleted": true })
        );
    }
}
