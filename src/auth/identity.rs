use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;
use crate::types::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A verified subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject: String,
    /// Role claim; accounts get one right after sign-up
    pub role: Option<Role>,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// Issued bearer credential
#[derive(Debug, Clone)]
pub struct Session {
    pub id_token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub identity: Identity,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("unknown subject {0}")]
    UnknownSubject(String),

    #[error("email already registered: {0}")]
    EmailExists(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password shorter than {0} characters")]
    WeakPassword(usize),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Verifies bearer credentials
#[async_trait]
pub trait IdentityGate: Send + Sync {
    async fn verify(&self, bearer: &str) -> Result<Identity, IdentityError>;
}

/// Account management on top of [`IdentityGate`], used by the auth endpoints
#[async_trait]
pub trait IdentityProvider: IdentityGate {
    async fn sign_up(&self, account: NewAccount) -> Result<Identity, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn set_role(&self, subject: &str, role: Role) -> Result<(), IdentityError>;

    /// Invalidate every token issued to the subject so far
    async fn revoke_sessions(&self, subject: &str) -> Result<(), IdentityError>;

    async fn update_account(&self, subject: &str, update: AccountUpdate) -> Result<Identity, IdentityError>;

    async fn delete_account(&self, subject: &str) -> Result<(), IdentityError>;
}

/// Lowercased address, or `InvalidEmail` when it does not look like `local@domain.tld`
pub fn normalize_email(raw: &str) -> Result<String, IdentityError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(IdentityError::InvalidEmail(raw.trim().to_string()))
    }
}

pub fn check_password(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_emails() {
        assert_eq!(normalize_email(" Ana@Melody.Test ").unwrap(), "ana@melody.test");
        for bad in ["", "ana", "ana@", "@melody.test", "ana@melody", "ana@@melody.test", "a na@melody.test", "ana@.test"] {
            assert!(normalize_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn enforces_minimum_password_length() {
        assert!(matches!(check_password("12345"), Err(IdentityError::WeakPassword(6))));
        assert!(check_password("123456").is_ok());
    }
}
