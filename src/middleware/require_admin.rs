use axum::{extract::Request, middleware::Next, response::Response};

use super::AuthUser;
use crate::auth::Access;
use crate::error::ApiError;
use crate::types::Role;

/// Gate for `/admin` routes; runs after [`super::jwt_auth_middleware`]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    user.require(Access::Role(Role::Admin))?;

    Ok(next.run(request).await)
}
