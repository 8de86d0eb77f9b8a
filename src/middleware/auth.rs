use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{Identity, IdentityError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;

/// Authenticated subject, injected into request extensions by [`jwt_auth_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
    pub role: Option<Role>,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            subject: identity.subject,
            role: identity.role,
            email: identity.email,
            display_name: identity.display_name,
        }
    }
}

/// Bearer authentication: verifies the token with the identity provider and injects [`AuthUser`]
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|err| {
        debug!("Rejected request without usable credentials: {}", err);
        ApiError::from(err)
    })?;

    let identity = state.identity.verify(token).await.map_err(|err| {
        if !matches!(err, IdentityError::Store(_)) {
            warn!("Token verification failed: {}", err);
        }
        ApiError::from(err)
    })?;

    debug!(subject = %identity.subject, "Authenticated request");
    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, IdentityError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(IdentityError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| IdentityError::InvalidToken("Authorization header is not valid text".into()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(IdentityError::MissingToken),
    }
}
