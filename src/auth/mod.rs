pub mod access;
pub mod identity;
pub mod local;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub use access::Access;
pub use identity::{AccountUpdate, Identity, IdentityError, IdentityGate, IdentityProvider, NewAccount, Session};
pub use local::LocalIdentityProvider;

/// Bearer token claims issued by [`LocalIdentityProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    /// Session epoch of the account at issue time; bumped by sign-out
    pub epoch: u64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String, email: String, epoch: u64, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            email,
            epoch,
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, IdentityError> {
    if secret.is_empty() {
        return Err(IdentityError::Signing("JWT secret not configured".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key).map_err(|e| IdentityError::Signing(e.to_string()))
}

/// Check signature and expiry; session revocation is checked by the provider
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, IdentityError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))
}
