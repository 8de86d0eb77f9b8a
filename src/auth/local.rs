use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::identity::{
    check_password, normalize_email, AccountUpdate, Identity, IdentityError, IdentityGate, IdentityProvider,
    NewAccount, Session,
};
use super::{generate_jwt, validate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::records::timestamp::next_created_at;
use crate::store::{to_fields, DocumentStore, Fields, Query, StoreError};
use crate::types::{collections, fields, Role};

/// Stored account; never leaves this module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[serde(default, skip_serializing)]
    id: String,
    email: String,
    /// bcrypt hash, salt included
    password_hash: String,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    session_epoch: u64,
    created_at: String,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            subject: self.id.clone(),
            role: self.role,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// bcrypt with the configured cost, on the blocking pool
async fn hash_password(password: &str, cost: u32) -> Result<String, IdentityError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))?
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, IdentityError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))?
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))
}

/// Identity provider backed by the `accounts` collection of the document store.
///
/// Tokens are HS256 JWTs carrying the account's session epoch; signing out bumps
/// the epoch so that every earlier token stops verifying.
pub struct LocalIdentityProvider {
    store: Arc<dyn DocumentStore>,
    jwt_secret: String,
    expiry_hours: u64,
    hash_cost: u32,
}

impl LocalIdentityProvider {
    pub fn new(store: Arc<dyn DocumentStore>, security: &SecurityConfig) -> Self {
        Self {
            store,
            jwt_secret: security.jwt_secret.clone(),
            expiry_hours: security.jwt_expiry_hours,
            hash_cost: security.password_hash_cost,
        }
    }

    async fn account(&self, subject: &str) -> Result<Option<Account>, IdentityError> {
        match self.store.get(collections::ACCOUNTS, subject).await? {
            Some(doc) => Ok(Some(doc.into_record()?)),
            None => Ok(None),
        }
    }

    async fn require_account(&self, subject: &str) -> Result<Account, IdentityError> {
        self.account(subject)
            .await?
            .ok_or_else(|| IdentityError::UnknownSubject(subject.to_string()))
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, IdentityError> {
        let query = Query::new(collections::ACCOUNTS).where_eq(fields::EMAIL, email).limit(1);
        match self.store.query(&query).await?.into_iter().next() {
            Some(doc) => Ok(Some(doc.into_record()?)),
            None => Ok(None),
        }
    }

    async fn save(&self, account: &Account) -> Result<(), IdentityError> {
        self.store.set(collections::ACCOUNTS, &account.id, to_fields(account)?).await?;
        Ok(())
    }

    fn issue(&self, account: &Account) -> Result<Session, IdentityError> {
        let claims = Claims::new(account.id.clone(), account.email.clone(), account.session_epoch, self.expiry_hours);
        Ok(Session {
            id_token: generate_jwt(&claims, &self.jwt_secret)?,
            expires_in: self.expiry_hours * 3600,
            identity: account.identity(),
        })
    }
}

#[async_trait]
impl IdentityGate for LocalIdentityProvider {
    async fn verify(&self, bearer: &str) -> Result<Identity, IdentityError> {
        let claims = validate_jwt(bearer, &self.jwt_secret)?;
        let account = self.require_account(&claims.sub).await?;
        if account.session_epoch != claims.epoch {
            return Err(IdentityError::TokenRevoked);
        }
        Ok(account.identity())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, new: NewAccount) -> Result<Identity, IdentityError> {
        let email = normalize_email(&new.email)?;
        check_password(&new.password)?;
        if self.account_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailExists(email));
        }

        let account = Account {
            id: uuid::Uuid::new_v4().simple().to_string(),
            password_hash: hash_password(&new.password, self.hash_cost).await?,
            email,
            role: None,
            display_name: new.display_name.filter(|n| !n.trim().is_empty()),
            session_epoch: 0,
            created_at: next_created_at(),
        };
        self.save(&account).await?;
        info!(subject = %account.id, "Created account");
        Ok(account.identity())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let account = match self.account_by_email(&email).await? {
            Some(account) if verify_password(password, &account.password_hash).await? => account,
            _ => {
                warn!("Failed sign-in attempt");
                return Err(IdentityError::InvalidCredentials);
            }
        };
        debug!(subject = %account.id, "Signed in");
        self.issue(&account)
    }

    async fn set_role(&self, subject: &str, role: Role) -> Result<(), IdentityError> {
        let mut patch = Fields::new();
        patch.insert(fields::ROLE.to_string(), serde_json::Value::String(role.as_str().to_string()));
        self.store
            .update(collections::ACCOUNTS, subject, patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => IdentityError::UnknownSubject(subject.to_string()),
                other => other.into(),
            })?;
        Ok(())
    }

    async fn revoke_sessions(&self, subject: &str) -> Result<(), IdentityError> {
        let mut account = self.require_account(subject).await?;
        account.session_epoch += 1;
        self.save(&account).await?;
        info!(subject, "Revoked sessions");
        Ok(())
    }

    async fn update_account(&self, subject: &str, update: AccountUpdate) -> Result<Identity, IdentityError> {
        let mut account = self.require_account(subject).await?;

        if let Some(raw) = update.email {
            let email = normalize_email(&raw)?;
            if email != account.email {
                if self.account_by_email(&email).await?.is_some() {
                    return Err(IdentityError::EmailExists(email));
                }
                account.email = email;
            }
        }
        if let Some(password) = update.password {
            check_password(&password)?;
            account.password_hash = hash_password(&password, self.hash_cost).await?;
        }
        if let Some(display_name) = update.display_name {
            account.display_name = Some(display_name).filter(|n| !n.trim().is_empty());
        }

        self.save(&account).await?;
        Ok(account.identity())
    }

    async fn delete_account(&self, subject: &str) -> Result<(), IdentityError> {
        self.store.delete(collections::ACCOUNTS, subject).await?;
        info!(subject, "Deleted account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::MemoryStore;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(Arc::new(MemoryStore::new()), &AppConfig::development().security)
    }

    fn account(email: &str) -> NewAccount {
        NewAccount { email: email.into(), password: "hunter22".into(), display_name: None }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let provider = provider();
        let identity = provider.sign_up(account("Ana@Melody.test")).await.unwrap();
        assert_eq!(identity.email, "ana@melody.test");
        assert_eq!(identity.role, None);

        provider.set_role(&identity.subject, Role::Musician).await.unwrap();
        let session = provider.sign_in("ana@melody.test", "hunter22").await.unwrap();
        let verified = provider.verify(&session.id_token).await.unwrap();
        assert_eq!(verified.subject, identity.subject);
        assert_eq!(verified.role, Some(Role::Musician));

        assert!(matches!(
            provider.sign_in("ana@melody.test", "wrong-pass").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = provider();
        provider.sign_up(account("ana@melody.test")).await.unwrap();
        assert!(matches!(
            provider.sign_up(account("ANA@melody.test")).await,
            Err(IdentityError::EmailExists(_))
        ));
    }

    #[tokio::test]
    async fn revoking_sessions_invalidates_earlier_tokens() {
        let provider = provider();
        let identity = provider.sign_up(account("ana@melody.test")).await.unwrap();
        let session = provider.sign_in("ana@melody.test", "hunter22").await.unwrap();

        provider.revoke_sessions(&identity.subject).await.unwrap();
        assert!(matches!(provider.verify(&session.id_token).await, Err(IdentityError::TokenRevoked)));

        let fresh = provider.sign_in("ana@melody.test", "hunter22").await.unwrap();
        assert!(provider.verify(&fresh.id_token).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_accounts_stop_verifying() {
        let provider = provider();
        let identity = provider.sign_up(account("ana@melody.test")).await.unwrap();
        let session = provider.sign_in("ana@melody.test", "hunter22").await.unwrap();

        provider.delete_account(&identity.subject).await.unwrap();
        assert!(matches!(provider.verify(&session.id_token).await, Err(IdentityError::UnknownSubject(_))));
        assert!(matches!(
            provider.sign_in("ana@melody.test", "hunter22").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn password_change_replaces_credentials() {
        let provider = provider();
        let identity = provider.sign_up(account("ana@melody.test")).await.unwrap();
        let update = AccountUpdate { password: Some("new-secret".into()), ..Default::default() };
        provider.update_account(&identity.subject, update).await.unwrap();

        assert!(provider.sign_in("ana@melody.test", "hunter22").await.is_err());
        assert!(provider.sign_in("ana@melody.test", "new-secret").await.is_ok());
    }

    #[tokio::test]
    async fn passwords_are_stored_as_bcrypt_hashes() {
        let provider = provider();
        let identity = provider.sign_up(account("ana@melody.test")).await.unwrap();

        let stored = provider.require_account(&identity.subject).await.unwrap().password_hash;
        assert!(stored.starts_with("$2"), "{stored}");
        assert!(!stored.contains("hunter22"));
        assert!(bcrypt::verify("hunter22", &stored).unwrap());

        let again = provider.sign_up(account("ben@melody.test")).await.unwrap();
        let other = provider.require_account(&again.subject).await.unwrap().password_hash;
        assert_ne!(stored, other, "same password must not produce the same hash");
    }
}
