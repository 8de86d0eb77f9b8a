use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::auth::{AccountUpdate, Identity, IdentityProvider, NewAccount, Session};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::records::timestamp::next_created_at;
use crate::records::UserProfile;
use crate::store::{to_fields, DocumentStore, Fields};
use crate::types::{collections, fields, Role};

/// Body of the sign-up endpoints; profile fields are optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Body of `PUT /users/me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

/// Account lifecycle: identity account plus the profile document in `users`
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Create the account, attach the role claim, write the profile and open a session
    pub async fn sign_up(&self, request: SignupRequest, role: Role) -> Result<Session, ApiError> {
        let identity = self
            .identity
            .sign_up(NewAccount {
                email: request.email,
                password: request.password.clone(),
                display_name: request.display_name.clone(),
            })
            .await?;
        self.identity.set_role(&identity.subject, role).await?;

        let profile = UserProfile {
            id: identity.subject.clone(),
            email: identity.email.clone(),
            role,
            name: request.name.filter(|n| !n.trim().is_empty()),
            location: request.location,
            display_name: identity.display_name.clone(),
            photo_url: request.photo_url,
            created_at: next_created_at(),
        };
        self.store
            .set(collections::USERS, &identity.subject, to_fields(&profile)?)
            .await?;
        info!(subject = %identity.subject, %role, "Registered user");

        Ok(self.identity.sign_in(&identity.email, &request.password).await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        Ok(self.identity.sign_in(email, password).await?)
    }

    pub async fn sign_out(&self, user: &AuthUser) -> Result<(), ApiError> {
        Ok(self.identity.revoke_sessions(&user.subject).await?)
    }

    pub async fn profile(&self, subject: &str) -> Result<Option<UserProfile>, ApiError> {
        match self.store.get(collections::USERS, subject).await? {
            Some(doc) => Ok(Some(doc.into_record()?)),
            None => Ok(None),
        }
    }

    /// Update the caller's account and mirror the visible fields onto the profile
    pub async fn update_me(&self, user: &AuthUser, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
        if update.email.is_none() && update.password.is_none() && update.display_name.is_none() && update.photo_url.is_none() {
            return Err(ApiError::validation_error("Update must change at least one field", None));
        }
        if self.profile(&user.subject).await?.is_none() {
            return Err(ApiError::not_found("Profile not found"));
        }

        let touches_display_name = update.display_name.is_some();
        let identity: Identity = self
            .identity
            .update_account(
                &user.subject,
                AccountUpdate {
                    email: update.email,
                    password: update.password,
                    display_name: update.display_name,
                },
            )
            .await?;

        let mut patch = Fields::new();
        patch.insert(fields::EMAIL.to_string(), identity.email.clone().into());
        if touches_display_name {
            // A blank name clears the account's, so the profile follows
            let display_name = identity.display_name.map(Value::String).unwrap_or(Value::Null);
            patch.insert("displayName".to_string(), display_name);
        }
        if let Some(photo_url) = update.photo_url {
            patch.insert("photoURL".to_string(), photo_url.into());
        }

        let doc = self.store.update(collections::USERS, &user.subject, patch).await?;
        info!(subject = %user.subject, "Updated profile");
        Ok(doc.into_record()?)
    }

    pub async fn delete_me(&self, user: &AuthUser) -> Result<(), ApiError> {
        self.identity.delete_account(&user.subject).await?;
        self.store.delete(collections::USERS, &user.subject).await?;
        info!(subject = %user.subject, "Deleted user");
        Ok(())
    }
}
