use futures::future::join_all;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::Access;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{paginate, Page, PageRequest};
use crate::records::timestamp::next_created_at;
use crate::records::{AdminEntry, OwnedRecord, Validate};
use crate::store::{to_fields, DocumentStore};
use crate::types::{collections, fields};

/// Label used when an owner's profile cannot be found
pub const UNKNOWN_USER: &str = "Unknown user";

/// CRUD and listings for any [`OwnedRecord`]
pub struct RecordService<R> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R: OwnedRecord> RecordService<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _record: PhantomData }
    }

    fn collection(&self) -> &'static str {
        R::LISTING.collection
    }

    pub async fn create(&self, user: &AuthUser, input: R::New) -> Result<R, ApiError> {
        input.validate()?;
        let mut document = to_fields(&input)?;
        document.insert(fields::OWNER.to_string(), user.subject.clone().into());
        document.insert(fields::CREATED_AT.to_string(), next_created_at().into());

        let doc = self.store.add(self.collection(), document).await?;
        info!(collection = self.collection(), id = %doc.id, owner = %user.subject, "Created {}", R::NOUN);
        Ok(doc.into_record()?)
    }

    pub async fn get(&self, id: &str) -> Result<R, ApiError> {
        match self.store.get(self.collection(), id).await? {
            Some(doc) => Ok(doc.into_record()?),
            None => Err(ApiError::not_found(format!("{} not found", R::NOUN))),
        }
    }

    /// Owner-only partial update
    pub async fn update(&self, user: &AuthUser, id: &str, patch: R::Patch) -> Result<R, ApiError> {
        let existing = self.get(id).await?;
        user.require(Access::Owner(existing.owner_id()))?;
        patch.validate()?;

        let doc = self.store.update(self.collection(), id, to_fields(&patch)?).await?;
        info!(collection = self.collection(), id, "Updated {}", R::NOUN);
        Ok(doc.into_record()?)
    }

    /// Owner or admin
    pub async fn delete(&self, user: &AuthUser, id: &str) -> Result<(), ApiError> {
        let existing = self.get(id).await?;
        user.require(Access::OwnerOrElevated(existing.owner_id()))?;

        self.store.delete(self.collection(), id).await?;
        info!(collection = self.collection(), id, by = %user.subject, "Deleted {}", R::NOUN);
        Ok(())
    }

    /// The caller's own records, with totals
    pub async fn list_for_owner(&self, user: &AuthUser, request: PageRequest) -> Result<Page<R>, ApiError> {
        let request = request.scoped(fields::OWNER, user.subject.as_str()).with_totals();
        let page = paginate(self.store.as_ref(), R::LISTING, &request).await?;
        Ok(page.try_map(|doc| doc.into_record())?)
    }

    /// Every owner's records, each labelled with the owner's name
    pub async fn list_all(&self, request: PageRequest) -> Result<Page<AdminEntry<R>>, ApiError> {
        let page = paginate(self.store.as_ref(), R::LISTING, &request).await?;
        let page: Page<R> = page.try_map(|doc| doc.into_record())?;

        let names = join_all(page.items.iter().map(|record| self.owner_name(record.owner_id()))).await;
        let mut names = names.into_iter();
        Ok(page.map(|record| AdminEntry {
            record,
            user_name: names.next().unwrap_or_else(|| UNKNOWN_USER.to_string()),
        }))
    }

    async fn owner_name(&self, owner: &str) -> String {
        let profile = match self.store.get(collections::USERS, owner).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(owner, "Owner lookup failed: {}", err);
                None
            }
        };
        profile
            .and_then(|doc| {
                doc.text("displayName")
                    .filter(|name| !name.trim().is_empty())
                    .or_else(|| doc.text(fields::EMAIL).filter(|email| !email.is_empty()))
            })
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }

    /// Admin delete: any record, `NotFound` when absent
    pub async fn admin_delete(&self, user: &AuthUser, id: &str) -> Result<(), ApiError> {
        self.get(id).await?;
        self.store.delete(self.collection(), id).await?;
        info!(collection = self.collection(), id, admin = %user.subject, "Admin deleted {}", R::NOUN);
        Ok(())
    }
}
