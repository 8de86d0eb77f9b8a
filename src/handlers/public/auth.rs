// handlers/public/auth.rs - POST /auth/signup-*, POST /auth/login

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SignupRequest;
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub id_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id_token: String,
    pub email: String,
    pub role: Option<Role>,
    pub display_name: String,
    pub expires_in: u64,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        let identity = session.identity;
        let display_name = identity
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| identity.email.split('@').next().unwrap_or_default().to_string());
        Self {
            id_token: session.id_token,
            email: identity.email,
            role: identity.role,
            display_name,
            expires_in: session.expires_in,
        }
    }
}

async fn signup(state: AppState, request: SignupRequest, role: Role) -> ApiResult<SignupResponse> {
    let session = state.users().sign_up(request, role).await?;
    Ok(ApiResponse::created(SignupResponse {
        uid: session.identity.subject,
        email: session.identity.email,
        role,
        id_token: session.id_token,
        expires_in: session.expires_in,
    }))
}

/// POST /auth/signup-client
pub async fn signup_client(State(state): State<AppState>, JsonBody(request): JsonBody<SignupRequest>) -> ApiResult<SignupResponse> {
    signup(state, request, Role::Client).await
}

/// POST /auth/signup-musician
pub async fn signup_musician(State(state): State<AppState>, JsonBody(request): JsonBody<SignupRequest>) -> ApiResult<SignupResponse> {
    signup(state, request, Role::Musician).await
}

/// POST /auth/signup-admin - only while `security.allow_admin_signup` is on
pub async fn signup_admin(State(state): State<AppState>, JsonBody(request): JsonBody<SignupRequest>) -> ApiResult<SignupResponse> {
    if !state.config.security.allow_admin_signup {
        tracing::warn!("Rejected admin sign-up: disabled by configuration");
        return Err(ApiError::forbidden("Admin sign-up is disabled"));
    }
    signup(state, request, Role::Admin).await
}

/// POST /auth/login
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> ApiResult<LoginResponse> {
    let session = state.users().sign_in(&request.email, &request.password).await?;
    Ok(ApiResponse::success(session.into()))
}
