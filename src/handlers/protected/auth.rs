// handlers/protected/auth.rs - session endpoints for authenticated users

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub uid: String,
    pub email: String,
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

/// POST /auth/signout - revoke every token issued to the caller
pub async fn signout(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    state.users().sign_out(&user).await?;
    Ok(ApiResponse::success(json!({ "message": "Signed out" })))
}

/// GET /auth/protected
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let user = WhoAmI {
        uid: user.subject,
        email: user.email,
        role: user.role,
        display_name: user.display_name,
    };
    Ok(ApiResponse::success(json!({ "user": user })))
}
